use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Draft,
    ProcessingFaces,
    ReadyToSplit,
    SplitConfirmed,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationStatus {
    Pending,
    MarkedPaid,
    Verified,
    Rejected,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub user_id: Uuid,
        /// The player record linked to the account.
        pub player_id: Uuid,
    }

    /// Profile patch for an account or a player. Absent fields are left
    /// untouched; an empty `email` or `phone` clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
    }
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionNew {
        pub name: String,
        pub description: Option<String>,
        /// RFC3339 timestamp, including timezone offset.
        pub event_date: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCreated {
        pub id: Uuid,
        pub status: SessionStatus,
    }

    /// Patch body; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SessionUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub event_date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum RoleFilter {
        Host,
        Player,
        All,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SessionSort {
        Date,
        CreatedAt,
        Name,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SortOrder {
        Asc,
        Desc,
    }

    /// Query string of the session listing.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SessionList {
        pub role: Option<RoleFilter>,
        /// Omitted means every status.
        pub status: Option<SessionStatus>,
        pub sort: Option<SessionSort>,
        pub order: Option<SortOrder>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }
}

pub mod participant {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlayerNew {
        pub name: String,
        pub email: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlayersAdd {
        pub players: Vec<PlayerNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub id: Uuid,
        pub player_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlayersAdded {
        /// Added or reactivated participants; players already on the roster
        /// are not listed.
        pub added: Vec<ParticipantView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub amount_minor: i64,
        /// Defaults to 1.
        pub quantity: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesAdd {
        pub items: Vec<ExpenseNew>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub quantity: Option<u32>,
    }
}

pub mod obligation {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum VerifyAction {
        Approve,
        Reject,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationVerify {
        pub action: VerifyAction,
        /// Required when rejecting.
        pub reason: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationView {
        pub id: Uuid,
        pub session_id: Uuid,
        pub payer_id: Uuid,
        pub amount_minor: i64,
        pub status: ObligationStatus,
    }
}

pub mod payment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum PaymentMethod {
        Cash,
        Transfer,
        Ewallet,
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentReport {
        pub method: PaymentMethod,
        pub reference_number: Option<String>,
        pub notes: Option<String>,
        /// Defaults to the time of the request.
        pub paid_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentCreated {
        pub id: Uuid,
        pub attempt: u32,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProofAttach {
        /// Opaque reference to stored media.
        pub media_ref: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProofCreated {
        pub id: Uuid,
    }
}

pub mod player {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SessionFilter {
        All,
        Pending,
        Paid,
        Verified,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PlayerSessions {
        pub filter: Option<SessionFilter>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PlayerObligations {
        pub status: Option<ObligationStatus>,
    }
}

pub mod error {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
        /// Set when a session cannot close yet.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub pending_count: Option<u64>,
    }
}

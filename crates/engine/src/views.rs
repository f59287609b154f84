//! Read models returned by the engine's query and orchestration operations.
//!
//! They are plain projections of stored rows; none of them is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ExpenseItem, Obligation, ObligationStatus, ParticipantRole, Payment, PaymentProof, Player,
    Session, SplitPlan, User,
};

/// Obligation counts per status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub marked_paid: u64,
    pub verified: u64,
    pub rejected: u64,
}

impl StatusCounts {
    pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a ObligationStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                ObligationStatus::Pending => counts.pending += 1,
                ObligationStatus::MarkedPaid => counts.marked_paid += 1,
                ObligationStatus::Verified => counts.verified += 1,
                ObligationStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u64 {
        self.pending + self.marked_paid + self.verified + self.rejected
    }

    pub fn unverified(&self) -> u64 {
        self.total() - self.verified
    }
}

/// An account together with its linked player record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub player: Player,
}

/// One row of a session listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionListItem {
    pub session: Session,
    pub my_role: ParticipantRole,
    pub participant_count: u64,
    /// Active non-host participants.
    pub payer_count: u64,
    pub verified_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPage {
    pub items: Vec<SessionListItem>,
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
}

impl SessionPage {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total_items.div_ceil(self.limit)
    }
}

/// A roster entry with the player's payment state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStatus {
    pub player: Player,
    pub role: ParticipantRole,
    /// `None` for the host and for payers before the split.
    pub obligation_status: Option<ObligationStatus>,
    pub obligation_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session: Session,
    pub my_role: ParticipantRole,
    pub participants: Vec<ParticipantStatus>,
    pub expenses: Vec<ExpenseItem>,
    pub per_person_minor: Option<i64>,
    pub paid_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub items: Vec<ExpenseItem>,
    pub total_minor: Option<i64>,
    pub payer_count: u64,
    pub per_person_minor: Option<i64>,
}

/// Result of split generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOutcome {
    pub session: Session,
    pub plan: SplitPlan,
    pub obligations: Vec<Obligation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationEntry {
    pub obligation: Obligation,
    pub payer_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationList {
    pub items: Vec<ObligationEntry>,
    pub counts: StatusCounts,
}

/// Returned when a session closes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub session: Session,
    /// Σ of verified obligation amounts.
    pub total_collected_minor: i64,
    /// Non-host participants that owed.
    pub participant_count: u64,
}

/// An obligation as seen by its payer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerObligationItem {
    pub obligation: Obligation,
    pub session_name: String,
    pub session_date: DateTime<Utc>,
    pub host_name: String,
    pub latest_payment: Option<Payment>,
    pub latest_proof: Option<PaymentProof>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerObligationTotals {
    /// Σ of non-verified obligation amounts.
    pub total_owed_minor: i64,
    pub pending_count: u64,
    /// Obligations past `PENDING`.
    pub paid_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerObligations {
    pub items: Vec<PlayerObligationItem>,
    pub summary: PlayerObligationTotals,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerObligationDetail {
    pub item: PlayerObligationItem,
    pub expenses: Vec<ExpenseItem>,
    pub total_minor: Option<i64>,
    pub per_person_minor: Option<i64>,
    pub payments: Vec<Payment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusView {
    pub payment: Payment,
    pub obligation_status: ObligationStatus,
    pub latest_proof: Option<PaymentProof>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSessionItem {
    pub session: Session,
    pub host_name: String,
    pub my_obligation: Option<Obligation>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSummary {
    pub total_sessions: u64,
    /// Hosted sessions not yet closed.
    pub active_sessions: u64,
    pub total_collected_minor: i64,
    pub pending_minor: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerSummary {
    pub total_sessions: u64,
    pub total_paid_minor: i64,
    pub pending_minor: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub as_host: HostSummary,
    pub as_player: PayerSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_each_status() {
        let statuses = [
            ObligationStatus::Pending,
            ObligationStatus::Verified,
            ObligationStatus::Verified,
            ObligationStatus::Rejected,
        ];
        let counts = StatusCounts::tally(statuses.iter());
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.verified, 2);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.unverified(), 2);
    }

    #[test]
    fn page_count_rounds_up() {
        let page = SessionPage {
            items: Vec::new(),
            page: 1,
            limit: 10,
            total_items: 21,
        };
        assert_eq!(page.total_pages(), 3);
    }
}

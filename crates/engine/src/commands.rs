//! Command structs for engine operations.
//!
//! These types group parameters for write operations (sessions, rosters,
//! expenses, payments) and list queries, keeping call sites readable and
//! avoiding long argument lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ObligationStatus, PaymentMethod, SessionStatus};

/// Create a session in `DRAFT`.
#[derive(Clone, Debug)]
pub struct NewSessionCmd {
    pub name: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
}

impl NewSessionCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, event_date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            description: None,
            event_date,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Patch a session; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateSessionCmd {
    pub name: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
}

impl UpdateSessionCmd {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn event_date(mut self, event_date: DateTime<Utc>) -> Self {
        self.event_date = Some(event_date);
        self
    }
}

/// Patch an account or player profile; `None` fields are left untouched and
/// an empty `email` or `phone` clears the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateProfileCmd {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UpdateProfileCmd {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// A player to find or create and add to a roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPlayerCmd {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewPlayerCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Add one expense line item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExpenseCmd {
    pub description: String,
    pub amount_minor: i64,
    pub quantity: u32,
}

impl NewExpenseCmd {
    #[must_use]
    pub fn new(description: impl Into<String>, amount_minor: i64) -> Self {
        Self {
            description: description.into(),
            amount_minor,
            quantity: 1,
        }
    }

    #[must_use]
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Patch an expense line item.
#[derive(Clone, Debug, Default)]
pub struct UpdateExpenseCmd {
    pub description: Option<String>,
    pub amount_minor: Option<i64>,
    pub quantity: Option<u32>,
}

impl UpdateExpenseCmd {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// Payer self-report of a payment.
#[derive(Clone, Debug)]
pub struct ReportPaymentCmd {
    pub method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl ReportPaymentCmd {
    #[must_use]
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            reference_number: None,
            notes: None,
            paid_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn reference_number(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn paid_at(mut self, paid_at: DateTime<Utc>) -> Self {
        self.paid_at = paid_at;
        self
    }
}

/// Host review of a reported payment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyDecision {
    Approve,
    Reject { reason: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleFilter {
    Host,
    Player,
    #[default]
    All,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSort {
    #[default]
    Date,
    CreatedAt,
    Name,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filters, ordering and pagination for session listings.
#[derive(Clone, Debug)]
pub struct SessionListQuery {
    pub role: RoleFilter,
    pub status: Option<SessionStatus>,
    pub sort: SessionSort,
    pub order: SortOrder,
    /// 1-based.
    pub page: u64,
    pub limit: u64,
}

impl Default for SessionListQuery {
    fn default() -> Self {
        Self {
            role: RoleFilter::All,
            status: None,
            sort: SessionSort::Date,
            order: SortOrder::Desc,
            page: 1,
            limit: 10,
        }
    }
}

impl SessionListQuery {
    #[must_use]
    pub fn role(mut self, role: RoleFilter) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: SessionSort, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    #[must_use]
    pub fn page(mut self, page: u64, limit: u64) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }
}

/// Filter for a player's sessions, by the player's own obligation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerSessionFilter {
    #[default]
    All,
    Pending,
    /// Reported but not yet reviewed.
    Paid,
    Verified,
}

impl PlayerSessionFilter {
    /// The obligation status a session must carry to match; `None` matches all.
    pub fn status(self) -> Option<ObligationStatus> {
        match self {
            Self::All => None,
            Self::Pending => Some(ObligationStatus::Pending),
            Self::Paid => Some(ObligationStatus::MarkedPaid),
            Self::Verified => Some(ObligationStatus::Verified),
        }
    }
}

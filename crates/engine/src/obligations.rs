//! Obligations: one payer owes the host a fixed amount for a session.
//!
//! At most one obligation exists per (session, payer). This is enforced by
//! [`Obligation::idempotency_key`], a deterministic function of the two ids
//! backed by a unique index, so repeated split generation or mark-paid calls
//! resolve to the same row.
//!
//! Status graph:
//!
//! ```text
//! PENDING ──payer──► MARKED_PAID ──approve──► VERIFIED
//!                      ▲     │
//!               payer  │     └──reject──► REJECTED
//!                      └─────────────────────┘
//! any ──host force verify──► VERIFIED
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationStatus {
    Pending,
    MarkedPaid,
    Verified,
    Rejected,
}

/// Who moves an obligation, and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObligationAction {
    /// The payer self-reports a payment.
    PayerReport,
    /// The host approves a reported payment.
    HostApprove,
    /// The host rejects a reported payment.
    HostReject,
    /// The host marks the player as paid without a report.
    HostForceVerify,
}

impl ObligationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::MarkedPaid => "marked_paid",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_verified(self) -> bool {
        self == Self::Verified
    }

    /// States from which the payer may submit a new payment.
    pub fn accepts_payment(self) -> bool {
        matches!(self, Self::Pending | Self::Rejected)
    }

    pub fn apply(self, action: ObligationAction) -> ResultEngine<ObligationStatus> {
        match (self, action) {
            (status, ObligationAction::PayerReport) if status.accepts_payment() => {
                Ok(Self::MarkedPaid)
            }
            (status, ObligationAction::PayerReport) => Err(EngineError::AlreadySettled(status)),
            (Self::MarkedPaid, ObligationAction::HostApprove) => Ok(Self::Verified),
            (Self::MarkedPaid, ObligationAction::HostReject) => Ok(Self::Rejected),
            (Self::Verified, ObligationAction::HostApprove | ObligationAction::HostReject) => {
                Err(EngineError::AlreadySettled(Self::Verified))
            }
            (status, ObligationAction::HostApprove | ObligationAction::HostReject) => {
                Err(EngineError::InvalidTransition(format!(
                    "obligation in status {status} has no payment to review"
                )))
            }
            (_, ObligationAction::HostForceVerify) => Ok(Self::Verified),
        }
    }
}

impl fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.as_str().to_ascii_uppercase())
    }
}

impl TryFrom<&str> for ObligationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "marked_paid" => Ok(Self::MarkedPaid),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidInput(format!(
                "invalid obligation status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: Uuid,
    pub session_id: Uuid,
    pub payer_id: Uuid,
    pub payee_id: Uuid,
    pub amount_minor: i64,
    pub status: ObligationStatus,
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Obligation {
    pub fn new(
        session_id: Uuid,
        payer_id: Uuid,
        payee_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<Self> {
        if amount_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be >= 0".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            session_id,
            payer_id,
            payee_id,
            amount_minor,
            status: ObligationStatus::Pending,
            idempotency_key: Self::idempotency_key(session_id, payer_id),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn idempotency_key(session_id: Uuid, payer_id: Uuid) -> String {
        format!("{session_id}:{payer_id}")
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "obligations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub session_id: String,
    pub payer_id: String,
    pub payee_id: String,
    pub amount_minor: i64,
    pub status: String,
    #[sea_orm(unique)]
    pub idempotency_key: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id"
    )]
    Session,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Obligation> for ActiveModel {
    fn from(obligation: &Obligation) -> Self {
        Self {
            id: ActiveValue::Set(obligation.id.to_string()),
            session_id: ActiveValue::Set(obligation.session_id.to_string()),
            payer_id: ActiveValue::Set(obligation.payer_id.to_string()),
            payee_id: ActiveValue::Set(obligation.payee_id.to_string()),
            amount_minor: ActiveValue::Set(obligation.amount_minor),
            status: ActiveValue::Set(obligation.status.as_str().to_string()),
            idempotency_key: ActiveValue::Set(obligation.idempotency_key.clone()),
            created_at: ActiveValue::Set(obligation.created_at),
            updated_at: ActiveValue::Set(obligation.updated_at),
        }
    }
}

impl TryFrom<Model> for Obligation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "obligation")?,
            session_id: parse_uuid(&model.session_id, "session")?,
            payer_id: parse_uuid(&model.payer_id, "payer")?,
            payee_id: parse_uuid(&model.payee_id, "payee")?,
            amount_minor: model.amount_minor,
            status: ObligationStatus::try_from(model.status.as_str())?,
            idempotency_key: model.idempotency_key,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ObligationAction::*;
    use ObligationStatus::*;

    #[test]
    fn payer_reports_from_pending_or_rejected() {
        assert_eq!(Pending.apply(PayerReport), Ok(MarkedPaid));
        assert_eq!(Rejected.apply(PayerReport), Ok(MarkedPaid));
    }

    #[test]
    fn payer_cannot_report_twice_or_after_verification() {
        assert_eq!(
            MarkedPaid.apply(PayerReport),
            Err(EngineError::AlreadySettled(MarkedPaid))
        );
        assert_eq!(
            Verified.apply(PayerReport),
            Err(EngineError::AlreadySettled(Verified))
        );
    }

    #[test]
    fn no_payer_action_reaches_verified() {
        for status in [Pending, MarkedPaid, Verified, Rejected] {
            assert_ne!(status.apply(PayerReport), Ok(Verified));
        }
    }

    #[test]
    fn host_reviews_only_marked_paid() {
        assert_eq!(MarkedPaid.apply(HostApprove), Ok(Verified));
        assert_eq!(MarkedPaid.apply(HostReject), Ok(Rejected));
        assert!(matches!(
            Pending.apply(HostApprove),
            Err(EngineError::InvalidTransition(_))
        ));
        assert!(matches!(
            Rejected.apply(HostReject),
            Err(EngineError::InvalidTransition(_))
        ));
        assert_eq!(
            Verified.apply(HostReject),
            Err(EngineError::AlreadySettled(Verified))
        );
    }

    #[test]
    fn force_verify_from_any_state() {
        for status in [Pending, MarkedPaid, Verified, Rejected] {
            assert_eq!(status.apply(HostForceVerify), Ok(Verified));
        }
    }

    #[test]
    fn idempotency_key_is_deterministic() {
        let session = Uuid::new_v4();
        let payer = Uuid::new_v4();
        assert_eq!(
            Obligation::idempotency_key(session, payer),
            Obligation::idempotency_key(session, payer)
        );
        assert_eq!(
            Obligation::idempotency_key(session, payer),
            format!("{session}:{payer}")
        );
        let a = Obligation::new(session, payer, Uuid::new_v4(), 10).unwrap();
        let b = Obligation::new(session, payer, Uuid::new_v4(), 10).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.idempotency_key, b.idempotency_key);
    }

    #[test]
    fn parses_upper_and_lower_case() {
        assert_eq!(ObligationStatus::try_from("MARKED_PAID"), Ok(MarkedPaid));
        assert_eq!(ObligationStatus::try_from("verified"), Ok(Verified));
        assert!(ObligationStatus::try_from("paid").is_err());
        assert_eq!(format!("{:<8}|", Pending), "PENDING |");
    }
}

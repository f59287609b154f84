//! Evidence attached to a payment.
//!
//! The engine stores an opaque media reference only. The proof's status
//! follows the host's review of the obligation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofStatus {
    Pending,
    Verified,
    Rejected,
}

impl ProofStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for ProofStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidInput(format!(
                "invalid proof status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub media_ref: String,
    pub status: ProofStatus,
    pub rejection_reason: Option<String>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PaymentProof {
    pub fn new(payment_id: Uuid, media_ref: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_id,
            media_ref,
            status: ProofStatus::Pending,
            rejection_reason: None,
            verified_by: None,
            verified_at: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_proofs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub payment_id: String,
    pub media_ref: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payment,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PaymentProof> for ActiveModel {
    fn from(proof: &PaymentProof) -> Self {
        Self {
            id: ActiveValue::Set(proof.id.to_string()),
            payment_id: ActiveValue::Set(proof.payment_id.to_string()),
            media_ref: ActiveValue::Set(proof.media_ref.clone()),
            status: ActiveValue::Set(proof.status.as_str().to_string()),
            rejection_reason: ActiveValue::Set(proof.rejection_reason.clone()),
            verified_by: ActiveValue::Set(proof.verified_by.map(|id| id.to_string())),
            verified_at: ActiveValue::Set(proof.verified_at),
            created_at: ActiveValue::Set(proof.created_at),
        }
    }
}

impl TryFrom<Model> for PaymentProof {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "proof")?,
            payment_id: parse_uuid(&model.payment_id, "payment")?,
            media_ref: model.media_ref,
            status: ProofStatus::try_from(model.status.as_str())?,
            rejection_reason: model.rejection_reason,
            verified_by: model
                .verified_by
                .as_deref()
                .map(|id| parse_uuid(id, "verifier"))
                .transpose()?,
            verified_at: model.verified_at,
            created_at: model.created_at,
        })
    }
}

//! Payments: one row per settlement attempt of an obligation.
//!
//! Attempts are numbered from 1 per obligation; the highest attempt is the
//! authoritative one.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Ewallet,
    Other,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Ewallet => "ewallet",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "transfer" => Ok(Self::Transfer),
            "ewallet" => Ok(Self::Ewallet),
            "other" => Ok(Self::Other),
            other => Err(EngineError::InvalidInput(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub obligation_id: Uuid,
    pub attempt: u32,
    pub method: PaymentMethod,
    pub amount_minor: i64,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub obligation_id: String,
    pub attempt: i32,
    pub method: String,
    pub amount_minor: i64,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub paid_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::obligations::Entity",
        from = "Column::ObligationId",
        to = "super::obligations::Column::Id"
    )]
    Obligation,
    #[sea_orm(has_many = "super::payment_proofs::Entity")]
    Proofs,
}

impl Related<super::obligations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligation.def()
    }
}

impl Related<super::payment_proofs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proofs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            obligation_id: ActiveValue::Set(payment.obligation_id.to_string()),
            attempt: ActiveValue::Set(i32::try_from(payment.attempt).unwrap_or(i32::MAX)),
            method: ActiveValue::Set(payment.method.as_str().to_string()),
            amount_minor: ActiveValue::Set(payment.amount_minor),
            reference_number: ActiveValue::Set(payment.reference_number.clone()),
            notes: ActiveValue::Set(payment.notes.clone()),
            paid_at: ActiveValue::Set(payment.paid_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            obligation_id: parse_uuid(&model.obligation_id, "obligation")?,
            attempt: u32::try_from(model.attempt)
                .map_err(|_| EngineError::InvalidInput("invalid payment attempt".to_string()))?,
            method: PaymentMethod::try_from(model.method.as_str())?,
            amount_minor: model.amount_minor,
            reference_number: model.reference_number,
            notes: model.notes,
            paid_at: model.paid_at,
        })
    }
}

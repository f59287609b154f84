//! Expense line items of a session.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub id: Uuid,
    pub session_id: Uuid,
    pub description: String,
    /// Unit amount in minor units.
    pub amount_minor: i64,
    pub quantity: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ExpenseItem {
    pub fn new(
        session_id: Uuid,
        description: String,
        amount_minor: i64,
        quantity: u32,
    ) -> ResultEngine<Self> {
        validate_amount(amount_minor)?;
        validate_quantity(quantity)?;
        Ok(Self {
            id: Uuid::new_v4(),
            session_id,
            description,
            amount_minor,
            quantity,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    /// `amount × quantity`, refusing to overflow.
    pub fn subtotal_minor(&self) -> ResultEngine<i64> {
        self.amount_minor
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| EngineError::InvalidAmount("expense subtotal overflow".to_string()))
    }
}

pub(crate) fn validate_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be >= 0".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_quantity(quantity: u32) -> ResultEngine<()> {
    if quantity == 0 || i32::try_from(quantity).is_err() {
        return Err(EngineError::InvalidAmount(
            "quantity must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub session_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id"
    )]
    Session,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseItem> for ActiveModel {
    fn from(item: &ExpenseItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            session_id: ActiveValue::Set(item.session_id.to_string()),
            description: ActiveValue::Set(item.description.clone()),
            amount_minor: ActiveValue::Set(item.amount_minor),
            // `validate_quantity` bounds the value to i32.
            quantity: ActiveValue::Set(i32::try_from(item.quantity).unwrap_or(i32::MAX)),
            is_active: ActiveValue::Set(item.is_active),
            created_at: ActiveValue::Set(item.created_at),
        }
    }
}

impl TryFrom<Model> for ExpenseItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            session_id: parse_uuid(&model.session_id, "session")?,
            description: model.description,
            amount_minor: model.amount_minor,
            quantity: u32::try_from(model.quantity)
                .map_err(|_| EngineError::InvalidAmount("invalid stored quantity".to_string()))?,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtotal_multiplies_quantity() {
        let item = ExpenseItem::new(Uuid::new_v4(), "Court".to_string(), 25_000, 3).unwrap();
        assert_eq!(item.subtotal_minor(), Ok(75_000));
    }

    #[test]
    fn rejects_negative_amount_and_zero_quantity() {
        assert!(matches!(
            ExpenseItem::new(Uuid::new_v4(), "x".to_string(), -1, 1),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            ExpenseItem::new(Uuid::new_v4(), "x".to_string(), 1, 0),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn free_items_are_allowed() {
        let item = ExpenseItem::new(Uuid::new_v4(), "Water".to_string(), 0, 10).unwrap();
        assert_eq!(item.subtotal_minor(), Ok(0));
    }

    #[test]
    fn subtotal_overflow_is_an_error() {
        let item = ExpenseItem::new(Uuid::new_v4(), "x".to_string(), i64::MAX, 2).unwrap();
        assert!(item.subtotal_minor().is_err());
    }
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, ExpenseItem, ExpenseLedger, ExpenseSummary, NewExpenseCmd, ParticipantRole,
    ResultEngine, SplitCalculator, UpdateExpenseCmd,
    expense_items::{self, validate_amount, validate_quantity},
    sessions,
    util::bounded_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Adds line items to a session and refreshes its total.
    pub async fn add_expenses(
        &self,
        session_id: Uuid,
        host_id: Uuid,
        items: Vec<NewExpenseCmd>,
    ) -> ResultEngine<Vec<ExpenseItem>> {
        if items.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one expense item is required".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            session.status.ensure_editable()?;

            let mut created = Vec::with_capacity(items.len());
            for cmd in &items {
                let description = bounded_text(&cmd.description, "description", 1, 255)?;
                let item =
                    ExpenseItem::new(session.id, description, cmd.amount_minor, cmd.quantity)?;
                expense_items::ActiveModel::from(&item).insert(&db_tx).await?;
                created.push(item);
            }

            let total = self.refresh_session_total(&db_tx, session.id).await?;
            info!(%session_id, added = created.len(), ?total, "expenses added");
            Ok(created)
        })
    }

    pub async fn update_expense(
        &self,
        session_id: Uuid,
        expense_id: Uuid,
        host_id: Uuid,
        cmd: UpdateExpenseCmd,
    ) -> ResultEngine<ExpenseItem> {
        let description = cmd
            .description
            .as_deref()
            .map(|d| bounded_text(d, "description", 1, 255))
            .transpose()?;
        if let Some(amount_minor) = cmd.amount_minor {
            validate_amount(amount_minor)?;
        }
        if let Some(quantity) = cmd.quantity {
            validate_quantity(quantity)?;
        }

        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            session.status.ensure_editable()?;
            let existing = self.require_expense(&db_tx, session.id, expense_id).await?;

            let mut active = expense_items::ActiveModel {
                id: ActiveValue::Unchanged(existing.id.to_string()),
                ..Default::default()
            };
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(amount_minor) = cmd.amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(quantity) = cmd.quantity {
                active.quantity = ActiveValue::Set(i32::try_from(quantity).unwrap_or(i32::MAX));
            }
            let item = ExpenseItem::try_from(active.update(&db_tx).await?)?;
            // Surface overflow before the total is recomputed.
            item.subtotal_minor()?;

            self.refresh_session_total(&db_tx, session.id).await?;
            Ok(item)
        })
    }

    /// Soft-deletes a line item.
    pub async fn delete_expense(
        &self,
        session_id: Uuid,
        expense_id: Uuid,
        host_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let session = self.require_session_host(&db_tx, session_id, host_id).await?;
            session.status.ensure_editable()?;
            let existing = self.require_expense(&db_tx, session.id, expense_id).await?;

            expense_items::ActiveModel {
                id: ActiveValue::Unchanged(existing.id.to_string()),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            self.refresh_session_total(&db_tx, session.id).await?;
            Ok(())
        })
    }

    /// Items, total and per-person amount of a session.
    pub async fn expense_summary(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<ExpenseSummary> {
        with_tx!(self, |db_tx| {
            let session = self.require_session(&db_tx, session_id).await?;
            self.require_session_viewer(&db_tx, &session, user_id).await?;

            let ledger = self.session_ledger(&db_tx, session.id).await?;
            let total_minor = ledger.total_minor()?;
            let payer_count = self
                .active_participants(&db_tx, session.id)
                .await?
                .iter()
                .filter(|p| p.role == ParticipantRole::Player)
                .count();
            Ok(ExpenseSummary {
                per_person_minor: SplitCalculator::per_person(total_minor.unwrap_or(0), payer_count),
                items: ledger.into_items(),
                total_minor,
                payer_count: payer_count as u64,
            })
        })
    }

    /// Active items of a session, oldest first.
    pub(super) async fn session_ledger(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
    ) -> ResultEngine<ExpenseLedger> {
        let items = expense_items::Entity::find()
            .filter(expense_items::Column::SessionId.eq(session_id.to_string()))
            .filter(expense_items::Column::IsActive.eq(true))
            .order_by_asc(expense_items::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(ExpenseItem::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(ExpenseLedger::new(items))
    }

    /// Stores the current ledger total on the session row.
    async fn refresh_session_total(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
    ) -> ResultEngine<Option<i64>> {
        let total = self.session_ledger(db, session_id).await?.total_minor()?;
        sessions::ActiveModel {
            id: ActiveValue::Unchanged(session_id.to_string()),
            total_amount_minor: ActiveValue::Set(total),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(total)
    }

    async fn require_expense(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<ExpenseItem> {
        let model = expense_items::Entity::find_by_id(expense_id.to_string())
            .filter(expense_items::Column::SessionId.eq(session_id.to_string()))
            .filter(expense_items::Column::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        ExpenseItem::try_from(model)
    }
}

//! In-memory view of a session's active expense items.

use crate::{ExpenseItem, ResultEngine, error::EngineError};

/// The active line items of one session and their payable total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseLedger {
    items: Vec<ExpenseItem>,
}

impl ExpenseLedger {
    /// Builds a ledger; inactive (soft-deleted) items are dropped.
    pub fn new(items: impl IntoIterator<Item = ExpenseItem>) -> Self {
        Self {
            items: items.into_iter().filter(|item| item.is_active).collect(),
        }
    }

    pub fn items(&self) -> &[ExpenseItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ExpenseItem> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ(amount × quantity), or `None` when the ledger has no items.
    pub fn total_minor(&self) -> ResultEngine<Option<i64>> {
        if self.items.is_empty() {
            return Ok(None);
        }
        let mut total: i64 = 0;
        for item in &self.items {
            total = total
                .checked_add(item.subtotal_minor()?)
                .ok_or_else(|| EngineError::InvalidAmount("expense total overflow".to_string()))?;
        }
        Ok(Some(total))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn item(session_id: Uuid, amount_minor: i64, quantity: u32) -> ExpenseItem {
        ExpenseItem::new(session_id, "item".to_string(), amount_minor, quantity).unwrap()
    }

    #[test]
    fn empty_ledger_has_no_total() {
        assert_eq!(ExpenseLedger::default().total_minor(), Ok(None));
    }

    #[test]
    fn total_skips_inactive_items() {
        let session_id = Uuid::new_v4();
        let mut deleted = item(session_id, 99_000, 1);
        deleted.is_active = false;
        let ledger = ExpenseLedger::new([
            item(session_id, 100_000, 1),
            item(session_id, 17_500, 2),
            deleted,
        ]);
        assert_eq!(ledger.items().len(), 2);
        assert_eq!(ledger.total_minor(), Ok(Some(135_000)));
    }

    #[test]
    fn only_inactive_items_means_no_total() {
        let mut deleted = item(Uuid::new_v4(), 10, 1);
        deleted.is_active = false;
        let ledger = ExpenseLedger::new([deleted]);
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_minor(), Ok(None));
    }
}

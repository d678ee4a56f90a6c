//! In-memory ledger store.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use ledger_types::{
    ListOrder, NewTransaction, OwnerId, RemoteError, RemoteLedgerClient, Transaction,
    TransactionId, TransactionPatch,
};

/// Process-local store, used for demos and tests.
///
/// Ids are assigned from a counter starting at 1 and never reused.
pub struct MemoryLedger {
    rows: DashMap<TransactionId, Transaction>,
    next_id: AtomicI64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored rows across all owners.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteLedgerClient for MemoryLedger {
    async fn list(
        &self,
        owner_id: &OwnerId,
        order: ListOrder,
    ) -> Result<Vec<Transaction>, RemoteError> {
        let mut rows: Vec<Transaction> = self
            .rows
            .iter()
            .filter(|entry| &entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();

        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        if order == ListOrder::DateDescending {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, RemoteError> {
        let id = TransactionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let stored = transaction.with_id(id);
        self.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<(), RemoteError> {
        let mut row = self.rows.get_mut(&id).ok_or(RemoteError::NotFound)?;
        let updated = row.apply(patch);
        *row = updated;
        Ok(())
    }

    async fn delete(&self, id: TransactionId) -> Result<(), RemoteError> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RemoteError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ledger_types::{Amount, Category, Direction};

    fn new_tx(owner: &str, day: u32) -> NewTransaction {
        NewTransaction {
            owner_id: OwnerId::new(owner),
            name: Some(format!("day {day}")),
            reason: None,
            date: Utc.with_ymd_and_hms(2025, 2, day, 0, 0, 0).unwrap(),
            direction: Direction::Outflow,
            category: Category::Utilities,
            amount: Amount::parse("12.5").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let ledger = MemoryLedger::new();
        let a = ledger.insert(new_tx("u", 1)).await.unwrap();
        let b = ledger.insert(new_tx("u", 1)).await.unwrap();

        assert_eq!(a.id, TransactionId::new(1));
        assert_eq!(b.id, TransactionId::new(2));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered() {
        let ledger = MemoryLedger::new();
        ledger.insert(new_tx("u", 3)).await.unwrap();
        ledger.insert(new_tx("other", 9)).await.unwrap();
        ledger.insert(new_tx("u", 5)).await.unwrap();
        ledger.insert(new_tx("u", 5)).await.unwrap();

        let owner = OwnerId::new("u");
        let desc: Vec<i64> = ledger
            .list(&owner, ListOrder::DateDescending)
            .await
            .unwrap()
            .iter()
            .map(|tx| tx.id.get())
            .collect();
        let asc: Vec<i64> = ledger
            .list(&owner, ListOrder::DateAscending)
            .await
            .unwrap()
            .iter()
            .map(|tx| tx.id.get())
            .collect();

        assert_eq!(desc, vec![4, 3, 1]);
        assert_eq!(asc, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let ledger = MemoryLedger::new();
        let missing = TransactionId::new(42);

        assert_eq!(
            ledger.update(missing, &TransactionPatch::default()).await,
            Err(RemoteError::NotFound)
        );
        assert_eq!(ledger.delete(missing).await, Err(RemoteError::NotFound));
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let ledger = MemoryLedger::new();
        let stored = ledger.insert(new_tx("u", 1)).await.unwrap();

        ledger
            .update(
                stored.id,
                &TransactionPatch {
                    name: Some(None),
                    category: Some(Category::Health),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let rows = ledger
            .list(&OwnerId::new("u"), ListOrder::default())
            .await
            .unwrap();
        assert_eq!(rows[0].name, None);
        assert_eq!(rows[0].category, Category::Health);
    }
}

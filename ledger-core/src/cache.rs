//! Local mirror of one owner's remote collection.

use std::cmp::Ordering;
use std::collections::HashMap;

use ledger_types::{
    LedgerError, ListOrder, OwnerId, RemoteLedgerClient, Transaction, TransactionId,
};

/// The transactions of the active owner, newest first.
///
/// Ids are unique: inserting an id that is already present replaces the row.
#[derive(Debug, Clone, Default)]
pub struct TransactionCache {
    entries: Vec<Transaction>,
}

impl TransactionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with the owner's remote rows.
    ///
    /// On failure the previous contents are kept.
    pub async fn load<R: RemoteLedgerClient + ?Sized>(
        &mut self,
        remote: &R,
        owner_id: &OwnerId,
    ) -> Result<(), LedgerError> {
        let rows = remote
            .list(owner_id, ListOrder::DateDescending)
            .await
            .map_err(LedgerError::Fetch)?;
        self.replace_all(rows);
        Ok(())
    }

    /// Wholesale replacement. Later duplicates of an id win.
    pub fn replace_all(&mut self, rows: Vec<Transaction>) {
        let mut by_id: HashMap<TransactionId, Transaction> = HashMap::with_capacity(rows.len());
        for row in rows {
            by_id.insert(row.id, row);
        }
        self.entries = by_id.into_values().collect();
        self.sort();
    }

    /// Inserts or replaces a row, returning the previous version.
    pub fn upsert(&mut self, transaction: Transaction) -> Option<Transaction> {
        let previous = match self.position(transaction.id) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index], transaction)),
            None => {
                self.entries.push(transaction);
                None
            }
        };
        self.sort();
        previous
    }

    pub fn remove(&mut self, id: TransactionId) -> Option<Transaction> {
        self.position(id).map(|index| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn all(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.entries.iter().find(|tx| tx.id == id)
    }

    pub fn contains(&self, id: TransactionId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: TransactionId) -> Option<usize> {
        self.entries.iter().position(|tx| tx.id == id)
    }

    fn sort(&mut self) {
        self.entries.sort_by(newest_first);
    }
}

/// Date descending, then id descending.
pub fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

//! Remote ledger port trait.
//!
//! This is the primary port: the store that owns the `control` rows.
//! Adapters (PostgREST, SQLite, in-memory) implement this trait.

use crate::domain::{OwnerId, Transaction, TransactionId};
use crate::dto::{ListOrder, NewTransaction, TransactionPatch};
use crate::error::RemoteError;

/// Row-level CRUD against the remote transaction collection.
///
/// Every call may suspend and may fail independently of local validation.
/// None of them are retried by callers in the core.
#[async_trait::async_trait]
pub trait RemoteLedgerClient: Send + Sync + 'static {
    /// Lists all rows owned by `owner_id` in the requested order.
    async fn list(
        &self,
        owner_id: &OwnerId,
        order: ListOrder,
    ) -> Result<Vec<Transaction>, RemoteError>;

    /// Inserts a row and returns it with its store-assigned id.
    async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, RemoteError>;

    /// Writes the present fields of `patch` to row `id`.
    async fn update(&self, id: TransactionId, patch: &TransactionPatch)
    -> Result<(), RemoteError>;

    /// Deletes row `id`.
    async fn delete(&self, id: TransactionId) -> Result<(), RemoteError>;
}

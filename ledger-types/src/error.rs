//! Error types for the ledger.

use crate::domain::TransactionId;

/// Domain-level errors (value rules broken by input).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Amount is too large")]
    AmountTooLarge,

    #[error("Amount is not a number: {0}")]
    InvalidAmount(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown movement type: {0}")]
    UnknownDirection(String),
}

/// Failures reported by a remote ledger adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote rejected request: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Row not found")]
    NotFound,

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Errors surfaced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Input rejected before any remote call.
    #[error("Validation failed: {0}")]
    Validation(#[from] DomainError),

    /// The id is not present in the local cache.
    #[error("Transaction {0} is not loaded")]
    NotFound(TransactionId),

    /// Another mutation on the same id has not resolved yet.
    #[error("Transaction {0} already has a mutation in flight")]
    Conflict(TransactionId),

    /// The remote call for a mutation failed.
    #[error("Remote mutation failed: {0}")]
    Remote(#[source] RemoteError),

    /// Loading the collection failed.
    #[error("Could not load transactions: {0}")]
    Fetch(#[source] RemoteError),

    /// The owning session was torn down.
    #[error("Ledger session is closed")]
    SessionClosed,
}

impl LedgerError {
    /// True for errors resolved locally, without contacting the remote store.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            LedgerError::Validation(_) | LedgerError::NotFound(_) | LedgerError::Conflict(_)
        )
    }
}

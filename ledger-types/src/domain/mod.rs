//! Domain models for the ledger.

pub mod amount;
pub mod category;
pub mod transaction;

pub use amount::{Amount, MAX_AMOUNT_UNITS};
pub use category::{Category, Direction};
pub use transaction::{OwnerId, Transaction, TransactionId, fecha};

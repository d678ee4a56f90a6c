//! # Ledger Types
//!
//! Domain types and port traits for the transaction ledger.
//! This crate has ZERO IO dependencies - only data structures,
//! value rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate is the **innermost core** of the hexagonal layout:
//! - `domain/` - Pure domain types (Amount, Category, Transaction)
//! - `ports/` - Traits that adapters must implement
//! - `dto/` - Drafts and patches crossing the mutation boundary
//! - `error/` - Domain, remote and ledger error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{Amount, Category, Direction, MAX_AMOUNT_UNITS, OwnerId, Transaction, TransactionId};
pub use dto::*;
pub use error::{DomainError, LedgerError, RemoteError};
pub use exchange_rates::{Market, RateQuote};
pub use ports::{RateError, RateProvider, RemoteLedgerClient};

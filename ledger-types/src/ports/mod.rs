//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The core depends on these traits, not concrete implementations.

mod rates;
mod remote;

pub use rates::{RateError, RateProvider};
pub use remote::RemoteLedgerClient;

//! # Ledger Client
//!
//! HTTP adapters for the ledger ports:
//! - [`PostgrestLedgerClient`] talks to the hosted `control` table through a
//!   PostgREST endpoint (`/rest/v1`).
//! - [`BluelyticsRates`] reads the latest dollar quotes.

pub mod bluelytics;
pub mod postgrest;

#[cfg(test)]
mod test_server;

pub use bluelytics::{BluelyticsRates, DEFAULT_RATES_URL};
pub use postgrest::{DEFAULT_TABLE, PostgrestLedgerClient};

/// Pulls a human-readable message out of an error body.
///
/// PostgREST reports `{"message": ...}`; other services use `error` or `msg`.
/// Falls back to the raw body.
pub(crate) fn error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "error", "msg"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(String::from))
        })
        .unwrap_or(body)
}

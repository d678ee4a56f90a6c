//! Dollar quote provider port.
//!
//! Implementations can be HTTP clients, fixed tables, etc.

use exchange_rates::{FixedRates, Market, RateQuote};

/// Error type for quote lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Quote not available for {0}")]
    QuoteNotAvailable(Market),

    #[error("Malformed quote: {0}")]
    Malformed(String),
}

/// Port trait for quote providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Latest quote for `market`.
    async fn latest(&self, market: Market) -> Result<RateQuote, RateError>;
}

#[async_trait::async_trait]
impl RateProvider for FixedRates {
    async fn latest(&self, market: Market) -> Result<RateQuote, RateError> {
        self.get(market)
            .cloned()
            .ok_or(RateError::QuoteNotAvailable(market))
    }
}

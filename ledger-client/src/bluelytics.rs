//! Bluelytics dollar quote adapter.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use ledger_types::{Market, RateError, RateProvider, RateQuote};

use crate::error_message;

pub const DEFAULT_RATES_URL: &str = "https://api.bluelytics.com.ar";

/// Reads `GET {base}/v2/latest`.
pub struct BluelyticsRates {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    oficial: Option<QuoteBody>,
    blue: Option<QuoteBody>,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    value_avg: Decimal,
    value_buy: Decimal,
    value_sell: Decimal,
}

impl BluelyticsRates {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

impl Default for BluelyticsRates {
    fn default() -> Self {
        Self::new(DEFAULT_RATES_URL)
    }
}

#[async_trait]
impl RateProvider for BluelyticsRates {
    async fn latest(&self, market: Market) -> Result<RateQuote, RateError> {
        let resp = self
            .http
            .get(format!("{}/v2/latest", self.base_url))
            .send()
            .await
            .map_err(|e| RateError::ServiceUnavailable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RateError::ServiceUnavailable(e.to_string()))?;
        if !status.is_success() {
            return Err(RateError::ServiceUnavailable(format!(
                "{} - {}",
                status.as_u16(),
                error_message(body)
            )));
        }

        let latest: LatestResponse =
            serde_json::from_str(&body).map_err(|e| RateError::Malformed(e.to_string()))?;
        let quote = match market {
            Market::Official => latest.oficial,
            Market::Blue => latest.blue,
        }
        .ok_or(RateError::QuoteNotAvailable(market))?;

        debug!(%market, sell = %quote.value_sell, "quote fetched");
        Ok(RateQuote {
            market,
            average: quote.value_avg,
            buy: quote.value_buy,
            sell: quote.value_sell,
        })
    }
}

//! Dollar Quotes and Amount Formatting
//!
//! Small, IO-free library shared by the ledger crates:
//!
//! - [`Market`] / [`RateQuote`] describe a quoted USD rate (official or "blue").
//! - [`FixedRates`] is a hardcoded quote table for development and testing.
//! - [`format_amount`] renders amounts the way the dashboard shows them
//!   (es-AR grouping, two fraction digits).
//!
//! Markets are declared once through `define_markets!`, which generates the
//! enum, its wire keys and the parsing/display impls.
//!
//! # Example
//! ```
//! use exchange_rates::{format_amount, FixedRates, Market};
//! use rust_decimal::Decimal;
//!
//! let rates = FixedRates::development();
//! let blue = rates.get(Market::Blue).unwrap();
//! assert!(blue.sell >= blue.buy);
//!
//! assert_eq!(format_amount(Decimal::new(123456, 2)), "1.234,56");
//! ```

use std::collections::HashMap;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Markets
// ─────────────────────────────────────────────────────────────────────────────

/// Error returned when parsing an unknown market key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown market: {0}")]
pub struct UnknownMarket(pub String);

/// Declares the quoted markets.
///
/// # Syntax
/// ```ignore
/// define_markets! {
///     Variant => ("wire_key", "Label"),
/// }
/// ```
macro_rules! define_markets {
    (
        $(
            $name:ident => ($key:literal, $label:literal)
        ),* $(,)?
    ) => {
        /// A market on which the dollar is quoted.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Market {
            $(
                #[serde(rename = $key)]
                $name
            ),*
        }

        impl Market {
            /// Key used by quote providers for this market.
            pub fn key(&self) -> &'static str {
                match self {
                    $(Market::$name => $key),*
                }
            }

            /// Human readable name.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Market::$name => $label),*
                }
            }

            pub fn all() -> &'static [Market] {
                &[$(Market::$name),*]
            }
        }

        impl std::str::FromStr for Market {
            type Err = UnknownMarket;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($key => Ok(Market::$name),)*
                    _ => Err(UnknownMarket(s.to_string())),
                }
            }
        }
    };
}

define_markets! {
    Official => ("oficial", "Dólar Oficial"),
    Blue => ("blue", "Dólar Blue"),
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Quotes
// ─────────────────────────────────────────────────────────────────────────────

/// A single USD quote in local currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    pub market: Market,
    pub average: Decimal,
    pub buy: Decimal,
    pub sell: Decimal,
}

impl RateQuote {
    /// Builds a quote from buy/sell prices, deriving the average.
    pub fn from_buy_sell(market: Market, buy: Decimal, sell: Decimal) -> Self {
        Self {
            market,
            average: (buy + sell) / Decimal::TWO,
            buy,
            sell,
        }
    }

    /// Difference between the selling and buying price.
    pub fn spread(&self) -> Decimal {
        self.sell - self.buy
    }
}

/// Hardcoded quote table.
#[derive(Debug, Clone, Default)]
pub struct FixedRates {
    quotes: HashMap<Market, RateQuote>,
}

impl FixedRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quotes used when no live provider is configured.
    pub fn development() -> Self {
        Self::new()
            .with_quote(RateQuote::from_buy_sell(
                Market::Official,
                Decimal::new(1_045_00, 2),
                Decimal::new(1_085_00, 2),
            ))
            .with_quote(RateQuote::from_buy_sell(
                Market::Blue,
                Decimal::new(1_210_00, 2),
                Decimal::new(1_230_00, 2),
            ))
    }

    /// Adds or replaces the quote for its market.
    pub fn with_quote(mut self, quote: RateQuote) -> Self {
        self.quotes.insert(quote.market, quote);
        self
    }

    pub fn get(&self, market: Market) -> Option<&RateQuote> {
        self.quotes.get(&market)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Formats an amount with `.` thousands separators and a `,` decimal mark,
/// always showing two fraction digits.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let negative =
        amount.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    if negative {
        format!("-{},{}", grouped, fraction)
    } else {
        format!("{},{}", grouped, fraction)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

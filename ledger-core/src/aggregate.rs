//! Derived views over a transaction collection.
//!
//! Everything here is a pure function of its input slice: no hidden state,
//! no incremental updates. Callers recompute after every cache change.

use std::collections::HashMap;

use ledger_types::{Category, Direction, Transaction};
use rust_decimal::Decimal;

/// Per-category sums split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBreakdown {
    /// Categories with at least one inflow
    pub inflow_by_category: HashMap<Category, Decimal>,
    /// Categories with at least one outflow
    pub outflow_by_category: HashMap<Category, Decimal>,
    /// Union of both key sets, in first-seen order
    pub categories: Vec<Category>,
}

impl CategoryBreakdown {
    /// Inflow total for `category`, zero when it has none.
    pub fn inflow(&self, category: Category) -> Decimal {
        self.inflow_by_category
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Outflow total for `category`, zero when it has none.
    pub fn outflow(&self, category: Category) -> Decimal {
        self.outflow_by_category
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Everything the dashboard derives from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationSnapshot {
    pub breakdown: CategoryBreakdown,
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    /// `total_inflow - total_outflow`
    pub balance: Decimal,
}

impl AggregationSnapshot {
    pub fn categories(&self) -> &[Category] {
        &self.breakdown.categories
    }

    pub fn inflow(&self, category: Category) -> Decimal {
        self.breakdown.inflow(category)
    }

    pub fn outflow(&self, category: Category) -> Decimal {
        self.breakdown.outflow(category)
    }
}

/// Bar chart input: one label per category, one value per direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSeries {
    pub labels: Vec<Category>,
    pub inflow: Vec<Decimal>,
    pub outflow: Vec<Decimal>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates `(category, inflow, outflow)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (Category, Decimal, Decimal)> + '_ {
        self.labels
            .iter()
            .zip(self.inflow.iter().zip(self.outflow.iter()))
            .map(|(label, (inflow, outflow))| (*label, *inflow, *outflow))
    }
}

/// Groups amounts by category, split by direction.
pub fn aggregate_by_category(transactions: &[Transaction]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::default();

    for tx in transactions {
        let bucket = match tx.direction {
            Direction::Inflow => &mut breakdown.inflow_by_category,
            Direction::Outflow => &mut breakdown.outflow_by_category,
        };
        *bucket.entry(tx.category).or_insert(Decimal::ZERO) += tx.amount.value();

        if !breakdown.categories.contains(&tx.category) {
            breakdown.categories.push(tx.category);
        }
    }

    breakdown
}

/// Σ inflow − Σ outflow over the whole collection.
pub fn balance(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(Transaction::signed_amount).sum()
}

/// Chart series over the category union. A category present in the union
/// reports zero for a direction it has no movements in.
pub fn chart_series(transactions: &[Transaction]) -> ChartSeries {
    series_from(&aggregate_by_category(transactions))
}

/// Computes the full snapshot in one pass over the grouping.
pub fn snapshot(transactions: &[Transaction]) -> AggregationSnapshot {
    let breakdown = aggregate_by_category(transactions);
    let total_inflow: Decimal = breakdown.inflow_by_category.values().copied().sum();
    let total_outflow: Decimal = breakdown.outflow_by_category.values().copied().sum();

    AggregationSnapshot {
        breakdown,
        total_inflow,
        total_outflow,
        balance: total_inflow - total_outflow,
    }
}

pub(crate) fn series_from(breakdown: &CategoryBreakdown) -> ChartSeries {
    ChartSeries {
        labels: breakdown.categories.clone(),
        inflow: breakdown
            .categories
            .iter()
            .map(|c| breakdown.inflow(*c))
            .collect(),
        outflow: breakdown
            .categories
            .iter()
            .map(|c| breakdown.outflow(*c))
            .collect(),
    }
}

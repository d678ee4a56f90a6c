//! Plain-text rendering for the terminal.

use std::fmt::Write;

use exchange_rates::format_amount;
use ledger_core::LedgerView;
use ledger_types::{Direction, RateQuote, Transaction};

pub fn render_table(rows: &[Transaction]) -> String {
    if rows.is_empty() {
        return "No hay movimientos.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:<10}  {:<7}  {:<16}  {:<20}  {:<20}  {:>14}",
        "ID", "Fecha", "Tipo", "Categoría", "Nombre", "Motivo", "Monto"
    );
    for tx in rows {
        let _ = writeln!(
            out,
            "{:>6}  {:<10}  {:<7}  {:<16}  {:<20}  {:<20}  {:>14}",
            tx.id,
            tx.date.format("%d/%m/%Y"),
            tx.direction.label(),
            tx.category.label(),
            clip(tx.name.as_deref().unwrap_or("-"), 20),
            clip(tx.reason.as_deref().unwrap_or("-"), 20),
            format_amount(tx.amount.value()),
        );
    }
    out
}

pub fn render_summary(view: &LedgerView) -> String {
    let snapshot = &view.snapshot;
    let mut out = String::new();
    let _ = writeln!(out, "Balance:  $ {}", format_amount(snapshot.balance));
    let _ = writeln!(out, "Ingresos: $ {}", format_amount(snapshot.total_inflow));
    let _ = writeln!(out, "Egresos:  $ {}", format_amount(snapshot.total_outflow));

    if !view.series.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<16}  {:>14}  {:>14}", "Categoría", "Ingresos", "Egresos");
        for (category, inflow, outflow) in view.series.rows() {
            let _ = writeln!(
                out,
                "{:<16}  {:>14}  {:>14}",
                category.label(),
                format_amount(inflow),
                format_amount(outflow),
            );
        }
    }
    out
}

pub fn render_quote(quote: &RateQuote) -> String {
    format!(
        "{}: compra $ {} / venta $ {} (promedio $ {})",
        quote.market.label(),
        format_amount(quote.buy),
        format_amount(quote.sell),
        format_amount(quote.average),
    )
}

/// One-line description used in confirmations.
pub fn describe(tx: &Transaction) -> String {
    let sign = match tx.direction {
        Direction::Inflow => "+",
        Direction::Outflow => "-",
    };
    format!(
        "#{} {} {} {} $ {}{}",
        tx.id,
        tx.date.format("%d/%m/%Y"),
        tx.category.label(),
        tx.name.as_deref().unwrap_or(""),
        sign,
        format_amount(tx.amount.value()),
    )
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

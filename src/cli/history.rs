use super::ui;
use crate::core::currency::{CurrencySettings, format_money};
use crate::store::TransactionLog;
use anyhow::{Context, Result};

/// Prints all recorded transactions, newest first.
pub fn run(ledger: &dyn TransactionLog, settings: &CurrencySettings) -> Result<()> {
    let mut transactions = ledger
        .list()
        .context("Failed to read the transaction ledger")?;
    if transactions.is_empty() {
        println!(
            "{}",
            ui::style_text("No transactions recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }
    transactions.reverse();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Side"),
        ui::header_cell("Symbol"),
        ui::header_cell("Units"),
        ui::header_cell("Price"),
        ui::header_cell("Amount"),
    ]);

    for tx in &transactions {
        let currency = settings.native_currency_for(&tx.symbol);
        table.add_row(vec![
            comfy_table::Cell::new(tx.date.format("%Y-%m-%d %H:%M").to_string()),
            ui::signed_cell(&tx.side.to_string(), tx.side == crate::core::TradeSide::Buy),
            comfy_table::Cell::new(&tx.symbol),
            ui::money_cell(&format!("{:.4}", tx.quantity)),
            ui::money_cell(&format_money(tx.price, currency)),
            ui::money_cell(&format_money(tx.quantity * tx.price, currency)),
        ]);
    }

    println!("{table}");
    Ok(())
}

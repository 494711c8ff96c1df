use super::ui;
use crate::core::basis;
use crate::core::currency::{Converter, CurrencyRateProvider, CurrencySettings, format_money};
use crate::core::quote::QuoteProvider;
use crate::core::valuation::{self, PortfolioSummary};
use crate::store::TransactionLog;
use anyhow::{Context, Result};

impl PortfolioSummary {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Name"),
            ui::header_cell("Units"),
            ui::header_cell("Price"),
            ui::header_cell(&format!("Value ({})", self.currency)),
            ui::header_cell("Avg Cost"),
            ui::header_cell("Gain/Loss"),
        ]);

        for holding in &self.holdings {
            let gain_text = format!(
                "{}{} ({:.2}%)",
                if holding.gain_loss >= 0.0 { "+" } else { "" },
                format_money(holding.display_gain_loss, &self.currency),
                holding.gain_loss_percent
            );

            table.add_row(vec![
                comfy_table::Cell::new(&holding.symbol),
                comfy_table::Cell::new(&holding.name),
                ui::money_cell(&format!("{:.4}", holding.quantity)),
                ui::money_cell(&format_money(holding.display_price, &self.currency)),
                ui::money_cell(&format_money(holding.display_value, &self.currency)),
                ui::money_cell(&format_money(holding.display_avg_price, &self.currency)),
                ui::signed_cell(&gain_text, holding.gain_loss >= 0.0),
            ]);
        }

        let mut output = format!(
            "Portfolio ({})\n\n",
            ui::style_text(&self.currency, ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let total_style = if self.total_gain_loss >= 0.0 {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };
        let total_gain = format!(
            "{}{} ({:.2}%)",
            if self.total_gain_loss >= 0.0 { "+" } else { "" },
            format_money(self.total_gain_loss, &self.currency),
            self.total_gain_loss_percent
        );
        output.push_str(&format!(
            "\n\n{} {}",
            ui::style_text("Total Value:", ui::StyleType::TotalLabel),
            format_money(self.total_value, &self.currency)
        ));
        output.push_str(&format!(
            "\n{} {}",
            ui::style_text("Total Gain/Loss:", ui::StyleType::TotalLabel),
            ui::style_text(&total_gain, total_style)
        ));

        output
    }
}

pub async fn run(
    ledger: &dyn TransactionLog,
    quotes: &dyn QuoteProvider,
    rates: &dyn CurrencyRateProvider,
    settings: &CurrencySettings,
    display_currency: &str,
) -> Result<()> {
    let transactions = ledger
        .list()
        .context("Failed to read the transaction ledger")?;
    if transactions.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "Your portfolio is empty. Record your first trade with `ivault buy`.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    let holdings = basis::holdings_from(&transactions)?;
    if holdings.is_empty() {
        println!(
            "{}",
            ui::style_text("All positions are closed.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    // One rate refresh per run; conversion works off this snapshot only.
    let converter = Converter::resolve(settings, display_currency, rates).await;

    let pb = ui::new_progress_bar(holdings.len() as u64, true);
    pb.set_message("Fetching quotes...");
    let summary = valuation::value_portfolio(&holdings, quotes, &converter, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    println!("{}", summary.display_as_table());
    Ok(())
}

use crate::core::basis;
use crate::core::currency::format_money;
use crate::core::quote::QuoteProvider;
use crate::core::transaction::{TradeSide, Transaction};
use crate::store::TransactionLog;
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::debug;

/// Records a trade. The symbol must resolve to a quote before it enters the
/// ledger; a sell is additionally replayed against the existing ledger so an
/// oversell is rejected before anything is written.
pub async fn run(
    ledger: &dyn TransactionLog,
    quotes: &dyn QuoteProvider,
    side: TradeSide,
    symbol: &str,
    quantity: f64,
    price: f64,
    date: Option<NaiveDate>,
) -> Result<()> {
    let date = match date {
        Some(d) => d.and_time(NaiveTime::MIN).and_utc(),
        None => Utc::now(),
    };
    let tx = Transaction::new(symbol, quantity, price, side, date)?;

    let quote = quotes
        .fetch_quote(&tx.symbol)
        .await
        .with_context(|| format!("Unknown symbol or quote unavailable: {}", tx.symbol))?;
    debug!(symbol = %tx.symbol, price = quote.price, "Symbol verified against quote provider");

    if side == TradeSide::Sell {
        let mut replay = ledger
            .list()
            .context("Failed to read the transaction ledger")?;
        replay.push(tx.clone());
        if let Err(e) = basis::fold_transactions(&replay) {
            bail!("Sell rejected: {e}");
        }
    }

    ledger.append(&tx)?;

    println!(
        "Recorded {} {} {} @ {} ({})",
        tx.side,
        tx.quantity,
        tx.symbol,
        format_money(tx.price, &quote.currency),
        quote.name
    );
    Ok(())
}

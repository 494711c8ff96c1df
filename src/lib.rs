pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::transaction::TradeSide;
use crate::providers::yahoo_finance::{
    YahooCurrencyProvider, YahooQuoteProvider, YahooSearchProvider,
};
use crate::store::ledger::LedgerStore;
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TradeArgs {
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Summary { currency: Option<String> },
    Buy(TradeArgs),
    Sell(TradeArgs),
    History,
    Search { query: String },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ledger = LedgerStore::open(&config.data_path()?)?;

    let base_url = config.yahoo_base_url();
    let quote_cache = Arc::new(Cache::new());
    let rate_cache = Arc::new(Cache::new());
    let quotes = YahooQuoteProvider::new(base_url, Arc::clone(&quote_cache));
    let rates = YahooCurrencyProvider::new(base_url, Arc::clone(&rate_cache));
    let search = YahooSearchProvider::new(base_url);

    match command {
        AppCommand::Summary { currency } => {
            let display = config.currency.display_currency(currency.as_deref())?;
            cli::summary::run(&ledger, &quotes, &rates, &config.currency, &display).await
        }
        AppCommand::Buy(args) => {
            cli::trade::run(
                &ledger,
                &quotes,
                TradeSide::Buy,
                &args.symbol,
                args.quantity,
                args.price,
                args.date,
            )
            .await
        }
        AppCommand::Sell(args) => {
            cli::trade::run(
                &ledger,
                &quotes,
                TradeSide::Sell,
                &args.symbol,
                args.quantity,
                args.price,
                args.date,
            )
            .await
        }
        AppCommand::History => cli::history::run(&ledger, &config.currency),
        AppCommand::Search { query } => cli::search::run(&search, &query).await,
    }
}

//! Quote access abstractions
//!
//! These are the crate's own stable shapes; everything the external data
//! provider calls its fields stays behind the adapters in `providers/`.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A live market quote. Ephemeral: fetched per request and never kept
/// beyond one command run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_close: Option<f64>,
    /// Native settlement currency of the instrument.
    pub currency: String,
    pub change: f64,
    pub change_percent: f64,
}

/// One ticker match from a free-text symbol search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub kind: String,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches one quote. Provider failure or an unknown symbol is an `Err`;
    /// the caller owns the fallback policy.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}

#[async_trait]
pub trait SymbolSearchProvider: Send + Sync {
    /// Searches tickers by free text. An empty query yields an empty list
    /// without touching the network.
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>>;
}

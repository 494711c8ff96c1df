//! Trade ledger records

use anyhow::{Result, ensure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TradeSide::Buy => "BUY",
                TradeSide::Sell => "SELL",
            }
        )
    }
}

/// A single recorded trade. Entries are append-only; they are never mutated
/// or deleted once written to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    pub side: TradeSide,
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Builds a validated transaction. The symbol is trimmed and uppercased
    /// so that every ledger entry for one instrument folds into one holding.
    pub fn new(
        symbol: &str,
        quantity: f64,
        price: f64,
        side: TradeSide,
        date: DateTime<Utc>,
    ) -> Result<Self> {
        let symbol = symbol.trim().to_uppercase();
        ensure!(!symbol.is_empty(), "Symbol must not be empty");
        ensure!(
            quantity > 0.0 && quantity.is_finite(),
            "Quantity must be a positive number, got {quantity}"
        );
        ensure!(
            price > 0.0 && price.is_finite(),
            "Price must be a positive number, got {price}"
        );

        Ok(Transaction {
            id: Uuid::new_v4(),
            symbol,
            quantity,
            price,
            side,
            date,
        })
    }
}

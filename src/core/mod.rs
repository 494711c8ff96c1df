//! Core business logic: ledger records, cost basis, currency, valuation

pub mod basis;
pub mod cache;
pub mod config;
pub mod currency;
pub mod log;
pub mod quote;
pub mod transaction;
pub mod valuation;

// Re-export main types for cleaner imports
pub use basis::{Holding, LedgerError, Position};
pub use currency::{Converter, CurrencyRateProvider, CurrencySettings};
pub use quote::{Quote, QuoteProvider, SymbolMatch, SymbolSearchProvider};
pub use transaction::{TradeSide, Transaction};
pub use valuation::{HoldingSummary, PortfolioSummary};

//! Append-only trade ledger persistence

pub mod ledger;
pub mod memory;

use crate::core::transaction::Transaction;
use anyhow::Result;

/// The transaction log. Append-only: entries are never rewritten or
/// removed. `list` returns entries in ascending date order.
pub trait TransactionLog: Send + Sync {
    fn append(&self, tx: &Transaction) -> Result<()>;
    fn list(&self) -> Result<Vec<Transaction>>;
}

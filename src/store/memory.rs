use super::TransactionLog;
use crate::core::transaction::Transaction;
use anyhow::Result;
use std::sync::RwLock;

/// In-memory ledger, used by tests.
#[derive(Default)]
pub struct MemoryLedger {
    entries: RwLock<Vec<Transaction>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionLog for MemoryLedger {
    fn append(&self, tx: &Transaction) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push(tx.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Transaction>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut listed = entries.clone();
        listed.sort_by_key(|tx| tx.date);
        Ok(listed)
    }
}

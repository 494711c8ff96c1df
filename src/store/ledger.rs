use super::TransactionLog;
use crate::core::transaction::Transaction;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Disk-backed transaction ledger. Keys are ordered so that a plain
/// partition scan yields entries chronologically, with same-date entries
/// kept in insertion order.
pub struct LedgerStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    next_seq: AtomicU64,
}

impl LedgerStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path.join("ledger"))
            .open()
            .with_context(|| format!("Failed to open ledger at {}", path.display()))?;
        let partition = keyspace
            .open_partition("transactions", PartitionCreateOptions::default())
            .context("Failed to open transactions partition")?;

        // Resume the insertion sequence past every stored entry. The
        // lexicographically last key does not necessarily carry the
        // highest sequence (a backdated trade can be appended later), so
        // all keys are scanned.
        let mut next_seq = 0u64;
        for entry in partition.iter() {
            let (key, _) = entry.context("Failed to read ledger entry")?;
            if let Some(seq) = parse_seq(&key) {
                next_seq = next_seq.max(seq + 1);
            }
        }

        Ok(LedgerStore {
            keyspace,
            partition,
            next_seq: AtomicU64::new(next_seq),
        })
    }

    // Fixed-width millis keep lexicographic order chronological; the
    // insertion sequence breaks ties between trades recorded with the
    // same date, so replays see them in the order they were accepted.
    fn key_for(&self, tx: &Transaction) -> String {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        format!("{:013}:{:010}", tx.date.timestamp_millis().max(0), seq)
    }
}

fn parse_seq(key: &[u8]) -> Option<u64> {
    std::str::from_utf8(key).ok()?.split(':').nth(1)?.parse().ok()
}

impl TransactionLog for LedgerStore {
    fn append(&self, tx: &Transaction) -> Result<()> {
        let value = serde_json::to_vec(tx).context("Failed to serialize transaction")?;
        self.partition.insert(self.key_for(tx), value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(symbol = %tx.symbol, side = %tx.side, "Appended transaction to ledger");
        Ok(())
    }

    fn list(&self) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();
        for entry in self.partition.iter() {
            let (_, value) = entry.context("Failed to read ledger entry")?;
            let tx: Transaction =
                serde_json::from_slice(&value).context("Corrupt ledger entry")?;
            transactions.push(tx);
        }
        Ok(transactions)
    }
}

//! Weighted-average cost-basis aggregation over the trade ledger
//!
//! A holding is never stored; it is recomputed from the full transaction
//! history on every query. The method is weighted-average cost, not FIFO: a
//! sell reduces the total cost proportionally and leaves the average price
//! of the remaining units unchanged.

use crate::core::transaction::{TradeSide, Transaction};
use std::collections::BTreeMap;
use thiserror::Error;

/// Quantities below this are treated as a closed position.
const QTY_EPSILON: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A sell exceeded the quantity held at that point in the ledger.
    /// Oversells are rejected rather than clamped; short positions are not
    /// supported.
    #[error(
        "invalid transaction sequence for {symbol}: sell of {sold} exceeds held quantity {held}"
    )]
    InvalidTransactionSequence {
        symbol: String,
        sold: f64,
        held: f64,
    },
}

/// Running fold state for one symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub quantity: f64,
    pub total_cost: f64,
}

/// Net open position derived from the ledger. Only symbols with a positive
/// remaining quantity become holdings.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub avg_price: f64,
}

/// Folds the ledger into per-symbol positions. The input may arrive in any
/// order; entries are replayed by ascending date since cost basis is
/// order-dependent.
pub fn fold_transactions(
    transactions: &[Transaction],
) -> Result<BTreeMap<String, Position>, LedgerError> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.date);

    let mut positions: BTreeMap<String, Position> = BTreeMap::new();
    for tx in ordered {
        let position = positions.entry(tx.symbol.clone()).or_default();
        match tx.side {
            TradeSide::Buy => {
                position.quantity += tx.quantity;
                position.total_cost += tx.quantity * tx.price;
            }
            TradeSide::Sell => {
                if tx.quantity > position.quantity + QTY_EPSILON {
                    return Err(LedgerError::InvalidTransactionSequence {
                        symbol: tx.symbol.clone(),
                        sold: tx.quantity,
                        held: position.quantity,
                    });
                }
                let avg_price = if position.quantity > 0.0 {
                    position.total_cost / position.quantity
                } else {
                    0.0
                };
                position.quantity -= tx.quantity;
                position.total_cost -= tx.quantity * avg_price;
            }
        }
    }

    Ok(positions)
}

/// Emits the open holdings. Symbols whose net quantity reached zero are
/// dropped.
pub fn holdings(positions: &BTreeMap<String, Position>) -> Vec<Holding> {
    positions
        .iter()
        .filter(|(_, position)| position.quantity > QTY_EPSILON)
        .map(|(symbol, position)| Holding {
            symbol: symbol.clone(),
            quantity: position.quantity,
            avg_price: position.total_cost / position.quantity,
        })
        .collect()
}

/// Convenience wrapper: ledger in, open holdings out.
pub fn holdings_from(transactions: &[Transaction]) -> Result<Vec<Holding>, LedgerError> {
    Ok(holdings(&fold_transactions(transactions)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn tx(
        symbol: &str,
        quantity: f64,
        price: f64,
        side: TradeSide,
        offset_days: i64,
    ) -> Transaction {
        Transaction::new(
            symbol,
            quantity,
            price,
            side,
            Utc::now() + Duration::days(offset_days),
        )
        .unwrap()
    }

    #[test]
    fn test_buys_accumulate_weighted_average() {
        let ledger = vec![
            tx("AAPL", 10.0, 100.0, TradeSide::Buy, 0),
            tx("AAPL", 10.0, 200.0, TradeSide::Buy, 1),
        ];

        let holdings = holdings_from(&ledger).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].quantity, 20.0);
        assert_eq!(holdings[0].avg_price, 150.0);
    }

    #[test]
    fn test_sell_price_does_not_move_remaining_avg() {
        let ledger = vec![
            tx("AAPL", 10.0, 100.0, TradeSide::Buy, 0),
            tx("AAPL", 5.0, 999.0, TradeSide::Sell, 1),
        ];

        let holdings = holdings_from(&ledger).unwrap();
        assert_eq!(holdings[0].quantity, 5.0);
        assert_eq!(holdings[0].avg_price, 100.0);
    }

    #[test]
    fn test_closed_position_is_absent() {
        let ledger = vec![
            tx("AAPL", 10.0, 100.0, TradeSide::Buy, 0),
            tx("AAPL", 10.0, 150.0, TradeSide::Sell, 1),
        ];

        assert!(holdings_from(&ledger).unwrap().is_empty());
    }

    #[test]
    fn test_oversell_is_rejected() {
        let ledger = vec![
            tx("AAPL", 5.0, 100.0, TradeSide::Buy, 0),
            tx("AAPL", 10.0, 100.0, TradeSide::Sell, 1),
        ];

        let err = fold_transactions(&ledger).unwrap_err();
        match err {
            LedgerError::InvalidTransactionSequence { symbol, sold, held } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(sold, 10.0);
                assert_eq!(held, 5.0);
            }
        }
    }

    #[test]
    fn test_sell_before_any_buy_is_rejected() {
        let ledger = vec![tx("AAPL", 1.0, 100.0, TradeSide::Sell, 0)];
        assert!(fold_transactions(&ledger).is_err());
    }

    #[test]
    fn test_replay_sorts_by_date_before_folding() {
        // Ledger handed over newest-first, as the history view produces it.
        let ledger = vec![
            tx("AAPL", 10.0, 100.0, TradeSide::Sell, 2),
            tx("AAPL", 10.0, 100.0, TradeSide::Buy, 1),
        ];

        // Valid only when replayed in chronological order.
        assert!(holdings_from(&ledger).unwrap().is_empty());
    }

    #[test]
    fn test_multiple_symbols_fold_independently() {
        let ledger = vec![
            tx("AAPL", 10.0, 150.0, TradeSide::Buy, 0),
            tx("THYAO.IS", 100.0, 250.0, TradeSide::Buy, 0),
            tx("AAPL", 5.0, 180.0, TradeSide::Buy, 1),
        ];

        let holdings = holdings_from(&ledger).unwrap();
        assert_eq!(holdings.len(), 2);
        let aapl = holdings.iter().find(|h| h.symbol == "AAPL").unwrap();
        assert_eq!(aapl.quantity, 15.0);
        assert_eq!(aapl.avg_price, 160.0);
        let thyao = holdings.iter().find(|h| h.symbol == "THYAO.IS").unwrap();
        assert_eq!(thyao.quantity, 100.0);
        assert_eq!(thyao.avg_price, 250.0);
    }

    #[test]
    fn test_fractional_full_exit_is_not_left_dangling() {
        let ledger = vec![
            tx("BTC-USD", 0.3, 60000.0, TradeSide::Buy, 0),
            tx("BTC-USD", 0.1, 61000.0, TradeSide::Sell, 1),
            tx("BTC-USD", 0.2, 62000.0, TradeSide::Sell, 2),
        ];

        assert!(holdings_from(&ledger).unwrap().is_empty());
    }
}

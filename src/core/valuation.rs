//! Portfolio valuation: holdings plus live quotes become a summary
//!
//! Quote fetches for distinct holdings fan out concurrently and are joined
//! before the summary is assembled; totals are accumulated in the display
//! currency, so mixed-currency portfolios sum correctly. A failing quote
//! never aborts the summary: the holding degrades to its own cost basis.

use crate::core::basis::Holding;
use crate::core::currency::Converter;
use crate::core::quote::QuoteProvider;
use futures::future::join_all;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HoldingSummary {
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub avg_price: f64,
    /// Native settlement currency the price fields below are quoted in.
    pub currency: String,
    pub current_price: f64,
    pub current_value: f64,
    pub cost_basis: f64,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
    /// Counterparts converted into the active display currency.
    pub display_price: f64,
    pub display_avg_price: f64,
    pub display_value: f64,
    pub display_gain_loss: f64,
}

#[derive(Debug, Clone)]
pub struct PortfolioSummary {
    /// Display-currency totals; per-holding values are converted before
    /// they are summed.
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub currency: String,
    pub holdings: Vec<HoldingSummary>,
}

/// Guarded percentage: a zero or negative cost basis yields 0, never a NaN
/// or infinity.
pub fn gain_loss_percent(gain_loss: f64, cost_basis: f64) -> f64 {
    if cost_basis > 0.0 {
        (gain_loss / cost_basis) * 100.0
    } else {
        0.0
    }
}

/// Values the portfolio. `on_quote` fires once per finished fetch so the
/// caller can drive a progress indicator.
pub async fn value_portfolio(
    holdings: &[Holding],
    quotes: &(dyn QuoteProvider),
    converter: &Converter,
    on_quote: &(dyn Fn() + Sync),
) -> PortfolioSummary {
    let quote_futures = holdings.iter().map(|holding| async move {
        let result = quotes.fetch_quote(&holding.symbol).await;
        on_quote();
        (holding, result)
    });
    let fetched = join_all(quote_futures).await;

    let mut rows = Vec::with_capacity(holdings.len());
    let mut total_value = 0.0;
    let mut total_cost = 0.0;

    for (holding, quote) in fetched {
        let (name, current_price, currency) = match quote {
            // A quote without a currency gets the suffix inference, the
            // same as a failed quote; an empty code has no conversion
            // path and would leave the holding unconverted.
            Ok(quote) if quote.currency.is_empty() => (
                quote.name,
                quote.price,
                converter.native_currency_for(&holding.symbol).to_string(),
            ),
            Ok(quote) => (quote.name, quote.price, quote.currency),
            Err(e) => {
                debug!(
                    symbol = %holding.symbol,
                    error = %e,
                    "Quote fetch failed, falling back to cost basis"
                );
                (
                    holding.symbol.clone(),
                    holding.avg_price,
                    converter.native_currency_for(&holding.symbol).to_string(),
                )
            }
        };

        let current_value = holding.quantity * current_price;
        let cost_basis = holding.quantity * holding.avg_price;
        let gain_loss = current_value - cost_basis;

        let display_value = converter.convert(current_value, &currency);
        let display_cost = converter.convert(cost_basis, &currency);
        total_value += display_value;
        total_cost += display_cost;

        rows.push(HoldingSummary {
            symbol: holding.symbol.clone(),
            name,
            quantity: holding.quantity,
            avg_price: holding.avg_price,
            current_price,
            current_value,
            cost_basis,
            gain_loss,
            gain_loss_percent: gain_loss_percent(gain_loss, cost_basis),
            display_price: converter.convert(current_price, &currency),
            display_avg_price: converter.convert(holding.avg_price, &currency),
            display_value,
            display_gain_loss: display_value - display_cost,
            currency,
        });
    }

    let total_gain_loss = total_value - total_cost;
    PortfolioSummary {
        total_value,
        total_cost,
        total_gain_loss,
        total_gain_loss_percent: gain_loss_percent(total_gain_loss, total_cost),
        currency: converter.display().to_string(),
        holdings: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencySettings;
    use crate::core::quote::Quote;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MockQuoteProvider {
        quotes: HashMap<String, Quote>,
        errors: HashMap<String, String>,
    }

    impl MockQuoteProvider {
        fn new() -> Self {
            MockQuoteProvider {
                quotes: HashMap::new(),
                errors: HashMap::new(),
            }
        }

        fn add_quote(&mut self, symbol: &str, price: f64, currency: &str, name: &str) {
            self.quotes.insert(
                symbol.to_string(),
                Quote {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    price,
                    previous_close: None,
                    currency: currency.to_string(),
                    change: 0.0,
                    change_percent: 0.0,
                },
            );
        }

        fn add_error(&mut self, symbol: &str, error_msg: &str) {
            self.errors
                .insert(symbol.to_string(), error_msg.to_string());
        }
    }

    #[async_trait]
    impl QuoteProvider for MockQuoteProvider {
        async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
            if let Some(error_msg) = self.errors.get(symbol) {
                return Err(anyhow!(error_msg.clone()));
            }
            self.quotes
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow!("Quote not found for {}", symbol))
        }
    }

    fn holding(symbol: &str, quantity: f64, avg_price: f64) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            quantity,
            avg_price,
        }
    }

    fn usd_converter() -> Converter {
        Converter::with_rate(&CurrencySettings::default(), "USD", 32.0)
    }

    #[tokio::test]
    async fn test_single_holding_gain() {
        let mut provider = MockQuoteProvider::new();
        provider.add_quote("AAPL", 200.0, "USD", "Apple Inc.");

        let holdings = vec![holding("AAPL", 15.0, 160.0)];
        let summary = value_portfolio(&holdings, &provider, &usd_converter(), &|| {}).await;

        assert_eq!(summary.holdings.len(), 1);
        let row = &summary.holdings[0];
        assert_eq!(row.name, "Apple Inc.");
        assert_eq!(row.current_value, 3000.0);
        assert_eq!(row.cost_basis, 2400.0);
        assert_eq!(row.gain_loss, 600.0);
        assert_eq!(row.gain_loss_percent, 25.0);
        assert_eq!(summary.total_value, 3000.0);
        assert_eq!(summary.total_gain_loss, 600.0);
        assert_eq!(summary.total_gain_loss_percent, 25.0);
    }

    #[tokio::test]
    async fn test_quote_failure_degrades_to_cost_basis() {
        let mut provider = MockQuoteProvider::new();
        provider.add_error("AAPL", "provider unavailable");

        let holdings = vec![holding("AAPL", 15.0, 160.0)];
        let summary = value_portfolio(&holdings, &provider, &usd_converter(), &|| {}).await;

        let row = &summary.holdings[0];
        assert_eq!(row.name, "AAPL");
        assert_eq!(row.current_price, 160.0);
        assert_eq!(row.gain_loss, 0.0);
        assert_eq!(row.gain_loss_percent, 0.0);
        assert_eq!(summary.total_gain_loss, 0.0);
    }

    #[tokio::test]
    async fn test_one_failing_symbol_does_not_abort_the_summary() {
        let mut provider = MockQuoteProvider::new();
        provider.add_quote("AAPL", 200.0, "USD", "Apple Inc.");
        provider.add_error("MSFT", "API unavailable");

        let holdings = vec![holding("AAPL", 10.0, 100.0), holding("MSFT", 5.0, 300.0)];
        let summary = value_portfolio(&holdings, &provider, &usd_converter(), &|| {}).await;

        assert_eq!(summary.holdings.len(), 2);
        assert_eq!(summary.holdings[0].gain_loss, 1000.0);
        assert_eq!(summary.holdings[1].gain_loss, 0.0);
        assert_eq!(summary.total_value, 2000.0 + 1500.0);
        assert_eq!(summary.total_gain_loss, 1000.0);
    }

    #[tokio::test]
    async fn test_mixed_currencies_are_converted_before_summing() {
        let mut provider = MockQuoteProvider::new();
        provider.add_quote("AAPL", 100.0, "USD", "Apple Inc.");
        provider.add_quote("THYAO.IS", 320.0, "TRY", "Turk Hava Yollari");

        let holdings = vec![holding("AAPL", 10.0, 100.0), holding("THYAO.IS", 10.0, 320.0)];
        let converter = Converter::with_rate(&CurrencySettings::default(), "TRY", 32.0);
        let summary = value_portfolio(&holdings, &provider, &converter, &|| {}).await;

        // 1000 USD -> 32000 TRY, plus 3200 TRY as-is.
        assert_eq!(summary.total_value, 35200.0);
        assert_eq!(summary.currency, "TRY");
        assert_eq!(summary.holdings[0].display_value, 32000.0);
        assert_eq!(summary.holdings[1].display_value, 3200.0);
    }

    #[tokio::test]
    async fn test_failed_quote_uses_symbol_suffix_for_currency() {
        let mut provider = MockQuoteProvider::new();
        provider.add_error("THYAO.IS", "down");

        let holdings = vec![holding("THYAO.IS", 10.0, 320.0)];
        let converter = Converter::with_rate(&CurrencySettings::default(), "TRY", 32.0);
        let summary = value_portfolio(&holdings, &provider, &converter, &|| {}).await;

        // Already in TRY, so no conversion should be applied to the fallback.
        assert_eq!(summary.holdings[0].currency, "TRY");
        assert_eq!(summary.holdings[0].display_value, 3200.0);
    }

    #[tokio::test]
    async fn test_quote_without_currency_uses_suffix_inference() {
        let mut provider = MockQuoteProvider::new();
        provider.add_quote("AAPL", 100.0, "", "Apple Inc.");
        provider.add_quote("THYAO.IS", 320.0, "", "Turk Hava Yollari");

        let holdings = vec![holding("AAPL", 10.0, 100.0), holding("THYAO.IS", 10.0, 320.0)];
        let converter = Converter::with_rate(&CurrencySettings::default(), "TRY", 32.0);
        let summary = value_portfolio(&holdings, &provider, &converter, &|| {}).await;

        assert_eq!(summary.holdings[0].currency, "USD");
        assert_eq!(summary.holdings[0].display_value, 32000.0);
        assert_eq!(summary.holdings[1].currency, "TRY");
        assert_eq!(summary.holdings[1].display_value, 3200.0);
    }

    #[tokio::test]
    async fn test_zero_cost_basis_percent_is_zero() {
        assert_eq!(gain_loss_percent(500.0, 0.0), 0.0);
        assert_eq!(gain_loss_percent(-500.0, 0.0), 0.0);
        assert_eq!(gain_loss_percent(0.0, 0.0), 0.0);
    }

    #[tokio::test]
    async fn test_progress_callback_fires_per_holding() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let mut provider = MockQuoteProvider::new();
        provider.add_quote("AAPL", 200.0, "USD", "Apple Inc.");
        provider.add_error("MSFT", "down");

        let holdings = vec![holding("AAPL", 1.0, 1.0), holding("MSFT", 1.0, 1.0)];
        let counter = AtomicUsize::new(0);
        value_portfolio(&holdings, &provider, &usd_converter(), &|| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}

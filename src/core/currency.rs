//! Currency conversion and money formatting
//!
//! Two currencies are supported: a primary (the default display currency,
//! typically the local market) and a secondary (the settlement currency of
//! instruments without a market suffix). A single scalar rate, primary units
//! per one secondary unit, covers both directions.

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CurrencySettings {
    /// Default display currency.
    pub primary: String,
    /// Settlement currency of instruments without the market suffix.
    pub secondary: String,
    /// Used when the live rate cannot be fetched. Must be positive.
    pub fallback_rate: f64,
    /// Symbol suffix marking instruments that settle in the primary currency.
    pub market_suffix: String,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            primary: "TRY".to_string(),
            secondary: "USD".to_string(),
            fallback_rate: 30.0,
            market_suffix: ".IS".to_string(),
        }
    }
}

impl CurrencySettings {
    /// The pseudo-symbol quoted for the exchange rate, e.g. `USDTRY=X`.
    pub fn pair_symbol(&self) -> String {
        format!("{}{}=X", self.secondary, self.primary)
    }

    /// Infers the settlement currency of an instrument from its symbol.
    pub fn native_currency_for<'a>(&'a self, symbol: &str) -> &'a str {
        if symbol.ends_with(&self.market_suffix) {
            &self.primary
        } else {
            &self.secondary
        }
    }

    /// Resolves the display currency for a run. `None` picks the primary;
    /// anything outside the two configured currencies is an error.
    pub fn display_currency(&self, requested: Option<&str>) -> Result<String> {
        match requested {
            None => Ok(self.primary.clone()),
            Some(code) => {
                let code = code.trim().to_uppercase();
                if code == self.primary || code == self.secondary {
                    Ok(code)
                } else {
                    bail!(
                        "Unsupported display currency '{code}', expected {} or {}",
                        self.primary,
                        self.secondary
                    );
                }
            }
        }
    }
}

/// Immutable conversion snapshot for one command run. Built once, after the
/// rate refresh, and passed explicitly to whoever renders money.
#[derive(Debug, Clone)]
pub struct Converter {
    settings: CurrencySettings,
    display: String,
    rate: f64,
}

impl Converter {
    /// Refreshes the exchange rate through the quote channel and returns a
    /// snapshot. Never fails and never yields a zero rate: a fetch error or
    /// a non-positive rate falls back to the configured constant.
    pub async fn resolve(
        settings: &CurrencySettings,
        display: &str,
        provider: &dyn CurrencyRateProvider,
    ) -> Self {
        let rate = match provider
            .get_rate(&settings.secondary, &settings.primary)
            .await
        {
            Ok(rate) if rate > 0.0 => rate,
            Ok(rate) => {
                warn!(rate, "Ignoring non-positive exchange rate, using fallback");
                settings.fallback_rate
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = settings.fallback_rate,
                    "Exchange rate fetch failed, using fallback"
                );
                settings.fallback_rate
            }
        };
        Self::with_rate(settings, display, rate)
    }

    pub fn with_rate(settings: &CurrencySettings, display: &str, rate: f64) -> Self {
        Converter {
            settings: settings.clone(),
            display: display.to_uppercase(),
            rate,
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn native_currency_for<'a>(&'a self, symbol: &str) -> &'a str {
        self.settings.native_currency_for(symbol)
    }

    /// Converts an amount from its native currency into the display
    /// currency. An unrecognized source currency is returned unchanged; that
    /// is a documented limitation of the two-currency model, logged so it
    /// does not pass silently.
    pub fn convert(&self, amount: f64, from: &str) -> f64 {
        let from = from.trim().to_uppercase();
        if from == self.display {
            return amount;
        }
        if from == self.settings.secondary && self.display == self.settings.primary {
            return amount * self.rate;
        }
        if from == self.settings.primary && self.display == self.settings.secondary {
            return amount / self.rate;
        }
        warn!(%from, display = %self.display, "No conversion path, amount kept unchanged");
        amount
    }

    /// Renders an amount in the display currency.
    pub fn format(&self, amount: f64) -> String {
        format_money(amount, &self.display)
    }
}

/// Formats an amount with the currency's conventional symbol, a thousands
/// separator and exactly two decimal places, e.g. `$1,234,567.89`.
pub fn format_money(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let rounded = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let grouped = group_thousands(int_part);

    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{grouped}.{frac_part}"),
        None => format!("{sign}{grouped}.{frac_part} {currency}"),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "TRY" => Some("₺"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(display: &str, rate: f64) -> Converter {
        Converter::with_rate(&CurrencySettings::default(), display, rate)
    }

    #[test]
    fn test_identity_when_source_matches_display() {
        let c = converter("TRY", 32.0);
        assert_eq!(c.convert(100.0, "TRY"), 100.0);
    }

    #[test]
    fn test_secondary_to_primary_multiplies() {
        let c = converter("TRY", 32.0);
        assert_eq!(c.convert(10.0, "USD"), 320.0);
    }

    #[test]
    fn test_primary_to_secondary_divides() {
        let c = converter("USD", 32.0);
        assert_eq!(c.convert(320.0, "TRY"), 10.0);
    }

    #[test]
    fn test_unrecognized_currency_is_identity() {
        let c = converter("TRY", 32.0);
        assert_eq!(c.convert(50.0, "EUR"), 50.0);
    }

    #[test]
    fn test_round_trip_recovers_amount() {
        let settings = CurrencySettings::default();
        let to_try = Converter::with_rate(&settings, "TRY", 32.5);
        let to_usd = Converter::with_rate(&settings, "USD", 32.5);

        for amount in [0.0, 1.0, 99.99, 1234567.891, -42.5] {
            let there = to_try.convert(amount, "USD");
            let back = to_usd.convert(there, "TRY");
            assert!((back - amount).abs() < 1e-9, "round trip lost {amount}");
        }
    }

    #[test]
    fn test_pair_symbol() {
        assert_eq!(CurrencySettings::default().pair_symbol(), "USDTRY=X");
    }

    #[test]
    fn test_native_currency_from_suffix() {
        let settings = CurrencySettings::default();
        assert_eq!(settings.native_currency_for("THYAO.IS"), "TRY");
        assert_eq!(settings.native_currency_for("AAPL"), "USD");
    }

    #[test]
    fn test_display_currency_selection() {
        let settings = CurrencySettings::default();
        assert_eq!(settings.display_currency(None).unwrap(), "TRY");
        assert_eq!(settings.display_currency(Some("usd")).unwrap(), "USD");
        assert!(settings.display_currency(Some("EUR")).is_err());
    }

    #[test]
    fn test_format_two_decimals_and_grouping() {
        assert_eq!(format_money(1234567.891, "USD"), "$1,234,567.89");
        assert_eq!(format_money(0.0, "USD"), "$0.00");
        assert_eq!(format_money(-1234.5, "USD"), "-$1,234.50");
        assert_eq!(format_money(999.999, "TRY"), "₺1,000.00");
        assert_eq!(format_money(12.3, "CHF"), "12.30 CHF");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_rate_error() {
        struct FailingProvider;

        #[async_trait]
        impl CurrencyRateProvider for FailingProvider {
            async fn get_rate(&self, _from: &str, _to: &str) -> Result<f64> {
                bail!("rate service unavailable")
            }
        }

        let settings = CurrencySettings::default();
        let c = Converter::resolve(&settings, "TRY", &FailingProvider).await;
        assert_eq!(c.rate(), settings.fallback_rate);
    }

    #[tokio::test]
    async fn test_resolve_rejects_zero_rate() {
        struct ZeroProvider;

        #[async_trait]
        impl CurrencyRateProvider for ZeroProvider {
            async fn get_rate(&self, _from: &str, _to: &str) -> Result<f64> {
                Ok(0.0)
            }
        }

        let settings = CurrencySettings::default();
        let c = Converter::resolve(&settings, "TRY", &ZeroProvider).await;
        assert_eq!(c.rate(), settings.fallback_rate);
    }
}

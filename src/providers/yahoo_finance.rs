use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::currency::CurrencyRateProvider;
use crate::core::quote::{Quote, QuoteProvider, SymbolMatch, SymbolSearchProvider};

const USER_AGENT: &str = "ivault/0.1";

/// Upper bound on any provider request; a hung fetch is treated as a
/// failure, never left pending.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

// Yahoo chart response, shared by the quote and the currency adapters.
#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    symbol: Option<String>,
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
    currency: Option<String>,
    #[serde(alias = "chartPreviousClose")]
    previous_close: Option<f64>,
    #[serde(alias = "longName")]
    long_name: Option<String>,
    #[serde(alias = "shortName")]
    short_name: Option<String>,
}

// QuoteProvider backed by the Yahoo Finance chart endpoint
pub struct YahooQuoteProvider {
    base_url: String,
    cache: Arc<Cache<String, Quote>>,
}

impl YahooQuoteProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Quote>>) -> Self {
        YahooQuoteProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        if let Some(cached) = self.cache.get(&symbol.to_string()).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        );
        debug!("Requesting quote from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse quote response for {}: {}", symbol, e))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No quote found for symbol: {}", symbol))?;
        let meta = item.meta;

        let price = meta.regular_market_price;
        let (change, change_percent) = match meta.previous_close {
            Some(prev) if prev > 0.0 => {
                let change = price - prev;
                (change, (change / prev) * 100.0)
            }
            _ => (0.0, 0.0),
        };

        let resolved = meta.symbol.unwrap_or_else(|| symbol.to_uppercase());
        let quote = Quote {
            name: meta
                .long_name
                .or(meta.short_name)
                .unwrap_or_else(|| resolved.clone()),
            symbol: resolved,
            price,
            previous_close: meta.previous_close,
            currency: meta.currency.unwrap_or_default(),
            change,
            change_percent,
        };

        // Keyed by the symbol as requested; the provider may report it
        // under a canonical spelling, which would never be looked up.
        self.cache.put(symbol.to_string(), quote.clone()).await;

        Ok(quote)
    }
}

// CurrencyRateProvider backed by the same chart endpoint via a pair
// pseudo-symbol such as `USDTRY=X`
pub struct YahooCurrencyProvider {
    base_url: String,
    cache: Arc<Cache<String, f64>>,
}

impl YahooCurrencyProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, f64>>) -> Self {
        YahooCurrencyProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[async_trait]
impl CurrencyRateProvider for YahooCurrencyProvider {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let symbol = format!("{from}{to}=X");
        if let Some(cached) = self.cache.get(&symbol).await {
            return Ok(cached);
        }

        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        debug!("Requesting currency rate from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", symbol))?;

        let rate = item.meta.regular_market_price;
        self.cache.put(symbol, rate).await;
        Ok(rate)
    }
}

// Symbol search backed by the Yahoo Finance search endpoint
pub struct YahooSearchProvider {
    base_url: String,
}

impl YahooSearchProvider {
    pub fn new(base_url: &str) -> Self {
        YahooSearchProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooSearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Deserialize, Debug)]
struct SearchQuote {
    symbol: Option<String>,
    longname: Option<String>,
    shortname: Option<String>,
    exchange: Option<String>,
    #[serde(alias = "quoteType")]
    quote_type: Option<String>,
    #[serde(default, alias = "isYahooFinance")]
    is_yahoo_finance: bool,
}

#[async_trait]
impl SymbolSearchProvider for YahooSearchProvider {
    #[instrument(
        name = "YahooSymbolSearch",
        skip(self),
        fields(query = %query)
    )]
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/finance/search", self.base_url);
        debug!("Searching symbols at {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .query(&[
                ("q", query),
                ("quotesCount", "10"),
                ("newsCount", "0"),
                ("enableFuzzyQuery", "false"),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for query: {}", e, query))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for query: {}",
                response.status(),
                query
            ));
        }

        let data = response.json::<YahooSearchResponse>().await?;

        let matches = data
            .quotes
            .into_iter()
            // The provider flags which matches are actually quotable.
            .filter(|q| q.is_yahoo_finance)
            .filter_map(|q| {
                let symbol = q.symbol?;
                Some(SymbolMatch {
                    name: q
                        .longname
                        .or(q.shortname)
                        .unwrap_or_else(|| symbol.clone()),
                    symbol,
                    exchange: q.exchange.unwrap_or_default(),
                    kind: q.quote_type.unwrap_or_default(),
                })
            })
            .collect();

        Ok(matches)
    }
}

//! Market-data collaborator: quote providers and the quote cache
//!
//! The engine itself never fetches anything; this layer turns an upstream
//! chart API response into a `PriceTick` and hands it to the refresher.
//! A small TTL cache in front of the provider keeps repeated refreshes of
//! the same symbol from hammering the upstream.

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::portfolio::position::PriceTick;

/// How long a cached quote stays fresh
pub const QUOTE_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed quote payload for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },
    #[error("Quote for {symbol} contains a non-finite price")]
    NonFinitePrice { symbol: String },
    #[error("No quote data for symbol {0}")]
    UnknownSymbol(String),
}

/// Source of market ticks for one symbol at a time
#[async_trait]
pub trait QuoteProvider {
    /// Name of the provider, for logging
    fn name(&self) -> &str;

    /// Fetch the latest tick for a symbol
    async fn fetch(&mut self, symbol: &str) -> Result<PriceTick, QuoteError>;
}

/// Quote provider backed by a Yahoo-style chart endpoint
pub struct HttpQuoteProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuoteProvider {
    pub fn new() -> Self {
        Self::with_base_url("https://query1.finance.yahoo.com/v8/finance/chart")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for HttpQuoteProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    fn name(&self) -> &str {
        "chart API"
    }

    async fn fetch(&mut self, symbol: &str) -> Result<PriceTick, QuoteError> {
        let url = format!(
            "{}/{}?interval=1d&range=2d",
            self.base_url.trim_end_matches('/'),
            symbol
        );
        debug!(symbol = %symbol, url = %url, "Fetching quote");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(QuoteError::UnknownSymbol(symbol.to_string()));
        }
        let payload: Value = response.error_for_status()?.json().await?;

        tick_from_chart(symbol, &payload)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

/// The subset of the chart `meta` block the tracker consumes
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<u64>,
    market_cap: Option<u64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    dividend_yield: Option<f64>,
}

/// Parse one chart-API response into a tick.
///
/// `regularMarketPrice` is mandatory; the change fields are derived from
/// the previous close when the payload carries one, otherwise left for the
/// engine to compute.
fn tick_from_chart(symbol: &str, payload: &Value) -> Result<PriceTick, QuoteError> {
    let response: ChartResponse =
        serde_json::from_value(payload.clone()).map_err(|e| QuoteError::Malformed {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

    if response.chart.error.is_some() {
        return Err(QuoteError::UnknownSymbol(symbol.to_string()));
    }

    let meta = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0).meta) })
        .ok_or_else(|| QuoteError::Malformed {
            symbol: symbol.to_string(),
            reason: "missing chart result".to_string(),
        })?;

    let price = finite_decimal(symbol, meta.regular_market_price)?.ok_or_else(|| {
        QuoteError::Malformed {
            symbol: symbol.to_string(),
            reason: "missing regularMarketPrice".to_string(),
        }
    })?;

    let previous_close = finite_decimal(symbol, meta.chart_previous_close)?;
    let (change, change_percent) = match previous_close {
        Some(prev) if prev > Decimal::ZERO => {
            let change = price - prev;
            (Some(change), Some(change / prev * Decimal::ONE_HUNDRED))
        }
        _ => (None, None),
    };

    Ok(PriceTick {
        price,
        change,
        change_percent,
        volume: meta.regular_market_volume,
        daily_high: finite_decimal(symbol, meta.regular_market_day_high)?,
        daily_low: finite_decimal(symbol, meta.regular_market_day_low)?,
        market_cap: meta.market_cap,
        pe_ratio: finite_decimal(symbol, meta.trailing_pe)?,
        dividend_yield: finite_decimal(symbol, meta.dividend_yield)?,
    })
}

/// Decimal from an upstream float; NaN/infinity is a hard error, absence is
/// not. This is the boundary where non-finite prices are rejected.
fn finite_decimal(symbol: &str, raw: Option<f64>) -> Result<Option<Decimal>, QuoteError> {
    match raw {
        None => Ok(None),
        Some(raw) if !raw.is_finite() => Err(QuoteError::NonFinitePrice {
            symbol: symbol.to_string(),
        }),
        Some(raw) => Decimal::from_f64(raw)
            .map(Some)
            .ok_or_else(|| QuoteError::NonFinitePrice {
                symbol: symbol.to_string(),
            }),
    }
}

struct CachedTick {
    tick: PriceTick,
    fetched_at: Instant,
}

/// TTL cache in front of any quote provider
pub struct CachedQuotes<P> {
    inner: P,
    ttl: Duration,
    entries: HashMap<String, CachedTick>,
}

impl<P: QuoteProvider + Send> CachedQuotes<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, QUOTE_CACHE_TTL)
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: HashMap::new(),
        }
    }
}

#[async_trait]
impl<P: QuoteProvider + Send> QuoteProvider for CachedQuotes<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&mut self, symbol: &str) -> Result<PriceTick, QuoteError> {
        let key = symbol.to_uppercase();

        if let Some(cached) = self.entries.get(&key) {
            if cached.fetched_at.elapsed() < self.ttl {
                debug!(symbol = %key, "Quote served from cache");
                return Ok(cached.tick.clone());
            }
        }

        let tick = self.inner.fetch(&key).await?;
        info!(symbol = %key, price = %tick.price, provider = self.inner.name(), "Fetched quote");
        self.entries.insert(
            key,
            CachedTick {
                tick: tick.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn chart_payload(price: f64, previous_close: f64) -> Value {
        json!({
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": price,
                        "chartPreviousClose": previous_close,
                        "regularMarketDayHigh": price + 1.0,
                        "regularMarketDayLow": price - 1.0,
                        "regularMarketVolume": 123456,
                    }
                }],
                "error": null,
            }
        })
    }

    #[test]
    fn test_tick_from_chart() {
        let tick = tick_from_chart("AAPL", &chart_payload(110.0, 100.0)).unwrap();
        assert_eq!(tick.price, dec!(110));
        assert_eq!(tick.change, Some(dec!(10)));
        assert_eq!(tick.change_percent, Some(dec!(10)));
        assert_eq!(tick.volume, Some(123456));
        assert_eq!(tick.daily_high, Some(dec!(111)));
        assert_eq!(tick.daily_low, Some(dec!(109)));
    }

    #[test]
    fn test_tick_without_previous_close_leaves_deltas_to_engine() {
        let payload = json!({
            "chart": {
                "result": [{"meta": {"regularMarketPrice": 50.5}}],
                "error": null,
            }
        });
        let tick = tick_from_chart("AAPL", &payload).unwrap();
        assert_eq!(tick.price, dec!(50.5));
        assert_eq!(tick.change, None);
        assert_eq!(tick.change_percent, None);
    }

    #[test]
    fn test_chart_error_is_unknown_symbol() {
        let payload = json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"},
            }
        });
        assert!(matches!(
            tick_from_chart("NOPE", &payload),
            Err(QuoteError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_missing_price_is_malformed() {
        let payload = json!({
            "chart": {"result": [{"meta": {}}], "error": null}
        });
        assert!(matches!(
            tick_from_chart("AAPL", &payload),
            Err(QuoteError::Malformed { .. })
        ));
    }

    /// Provider that serves from a queue and counts upstream hits
    struct ScriptedProvider {
        ticks: Vec<PriceTick>,
        calls: usize,
    }

    impl ScriptedProvider {
        fn new(prices: &[Decimal]) -> Self {
            Self {
                ticks: prices
                    .iter()
                    .rev()
                    .map(|p| PriceTick::price_only(*p))
                    .collect(),
                calls: 0,
            }
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch(&mut self, symbol: &str) -> Result<PriceTick, QuoteError> {
            self.calls += 1;
            self.ticks
                .pop()
                .ok_or_else(|| QuoteError::UnknownSymbol(symbol.to_string()))
        }
    }

    #[tokio::test]
    async fn test_cache_serves_within_ttl() {
        let provider = ScriptedProvider::new(&[dec!(100), dec!(200)]);
        let mut cached = CachedQuotes::with_ttl(provider, Duration::from_secs(300));

        let first = cached.fetch("aapl").await.unwrap();
        let second = cached.fetch("AAPL").await.unwrap();

        // Second call is a cache hit despite the different spelling
        assert_eq!(first.price, dec!(100));
        assert_eq!(second.price, dec!(100));
        assert_eq!(cached.inner.calls, 1);
    }

    #[tokio::test]
    async fn test_cache_refetches_after_expiry() {
        let provider = ScriptedProvider::new(&[dec!(100), dec!(200)]);
        let mut cached = CachedQuotes::with_ttl(provider, Duration::ZERO);

        assert_eq!(cached.fetch("AAPL").await.unwrap().price, dec!(100));
        assert_eq!(cached.fetch("AAPL").await.unwrap().price, dec!(200));
        assert_eq!(cached.inner.calls, 2);
    }
}

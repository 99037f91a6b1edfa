//! Daily price history via Yahoo Finance

use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// One daily OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// Source of daily price history
///
/// The fetch stage depends on this seam, so tests can substitute a mock
/// source and exercise the skip-and-continue behavior without the network.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Fetch a trailing window of daily bars for a symbol
    async fn daily_history(&self, symbol: &str, days: i64) -> Result<Vec<Quote>>;
}

/// Yahoo Finance price-history client
pub struct MarketDataClient {}

impl MarketDataClient {
    /// Create a new market-data client
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for MarketDataClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceHistorySource for MarketDataClient {
    /// Returns an error when the provider yields no usable rows; the caller
    /// decides whether that drops the symbol or aborts.
    async fn daily_history(&self, symbol: &str, days: i64) -> Result<Vec<Quote>> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(days);

        let provider = yahoo::YahooConnector::new()
            .map_err(|e| AdvisorError::YahooFinance(e.to_string()))?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| AdvisorError::YahooFinance(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| AdvisorError::YahooFinance(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| AdvisorError::YahooFinance(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| AdvisorError::YahooFinance(e.to_string()))?;

        if quotes.is_empty() {
            return Err(AdvisorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no historical rows returned".to_string(),
            });
        }

        debug!(symbol, rows = quotes.len(), "fetched daily history");

        Ok(quotes
            .iter()
            .map(|q| Quote {
                symbol: symbol.to_string(),
                date: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now)
                    .date_naive(),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
                adjclose: q.adjclose,
            })
            .collect())
    }
}

//! Technical indicator derivation
//!
//! Enriches a daily OHLCV series with a fixed battery of indicators:
//! SMA-20/50, MACD(12,26,9), RSI-14, Bollinger bands (20, 2.0), ATR-14, OBV,
//! slow stochastic %K and a 20-day volume average. All of the math lives in
//! the `ta` crate; this module only streams bars through it.

use crate::api::Quote;
use crate::error::{AdvisorError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::indicators::{
    AverageTrueRange, BollingerBands, MovingAverageConvergenceDivergence, OnBalanceVolume,
    RelativeStrengthIndex, SimpleMovingAverage, SlowStochastic,
};
use ta::{DataItem, Next};

/// One daily bar with its derived indicator values
///
/// Indicator fields are `None` only when the series could not be enriched;
/// within an enriched series every bar carries the streaming value as of that
/// day (early values lean on the indicator's warm-up behavior).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,

    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub rsi_14: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub atr_14: Option<f64>,
    pub obv: Option<f64>,
    pub stoch_k: Option<f64>,
    pub volume_sma_20: Option<f64>,
}

/// Compute the indicator battery over a daily series, oldest first
pub fn enrich(quotes: &[Quote]) -> Result<Vec<IndicatorBar>> {
    if quotes.is_empty() {
        return Err(AdvisorError::Indicator(
            "cannot enrich an empty price series".to_string(),
        ));
    }

    let mut sma_20 = SimpleMovingAverage::new(20).map_err(indicator_err)?;
    let mut sma_50 = SimpleMovingAverage::new(50).map_err(indicator_err)?;
    let mut macd = MovingAverageConvergenceDivergence::new(12, 26, 9).map_err(indicator_err)?;
    let mut rsi_14 = RelativeStrengthIndex::new(14).map_err(indicator_err)?;
    let mut bollinger = BollingerBands::new(20, 2.0).map_err(indicator_err)?;
    let mut atr_14 = AverageTrueRange::new(14).map_err(indicator_err)?;
    let mut obv = OnBalanceVolume::new();
    let mut stoch = SlowStochastic::new(14, 3).map_err(indicator_err)?;
    let mut volume_sma_20 = SimpleMovingAverage::new(20).map_err(indicator_err)?;

    let mut bars = Vec::with_capacity(quotes.len());

    for quote in quotes {
        let item = data_item(quote)?;

        let macd_out = macd.next(quote.close);
        let bb_out = bollinger.next(quote.close);

        bars.push(IndicatorBar {
            date: quote.date,
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            sma_20: Some(sma_20.next(quote.close)),
            sma_50: Some(sma_50.next(quote.close)),
            macd: Some(macd_out.macd),
            macd_signal: Some(macd_out.signal),
            macd_hist: Some(macd_out.histogram),
            rsi_14: Some(rsi_14.next(quote.close)),
            bb_upper: Some(bb_out.upper),
            bb_middle: Some(bb_out.average),
            bb_lower: Some(bb_out.lower),
            atr_14: Some(atr_14.next(&item)),
            obv: Some(obv.next(&item)),
            stoch_k: Some(stoch.next(&item)),
            volume_sma_20: Some(volume_sma_20.next(quote.volume as f64)),
        });
    }

    Ok(bars)
}

/// Build a validated `ta` bar from a raw quote
///
/// Provider rows occasionally carry a close a hair outside the high/low
/// range; widen the range instead of dropping the row.
fn data_item(quote: &Quote) -> Result<DataItem> {
    let high = quote.high.max(quote.open).max(quote.close).max(quote.low);
    let low = quote.low.min(quote.open).min(quote.close).min(quote.high);

    DataItem::builder()
        .open(quote.open)
        .high(high)
        .low(low)
        .close(quote.close)
        .volume(quote.volume as f64)
        .build()
        .map_err(indicator_err)
}

fn indicator_err(e: impl std::fmt::Display) -> AdvisorError {
    AdvisorError::Indicator(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_series(len: usize) -> Vec<Quote> {
        (0..len)
            .map(|i| {
                // Gentle uptrend with a fixed daily range
                let close = 100.0 + i as f64 * 0.5;
                Quote {
                    symbol: "TEST".to_string(),
                    date: NaiveDate::from_ymd_opt(2025, 1, 1)
                        .unwrap()
                        .checked_add_days(chrono::Days::new(i as u64))
                        .unwrap(),
                    open: close - 0.2,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000_000 + (i as u64) * 1_000,
                    adjclose: close,
                }
            })
            .collect()
    }

    #[test]
    fn test_enrich_empty_series_fails() {
        assert!(enrich(&[]).is_err());
    }

    #[test]
    fn test_enrich_preserves_length_and_order() {
        let quotes = synthetic_series(60);
        let bars = enrich(&quotes).unwrap();

        assert_eq!(bars.len(), 60);
        assert_eq!(bars[0].date, quotes[0].date);
        assert_eq!(bars[59].date, quotes[59].date);
        assert_eq!(bars[59].close, quotes[59].close);
    }

    #[test]
    fn test_battery_is_populated() {
        let bars = enrich(&synthetic_series(60)).unwrap();
        let last = bars.last().unwrap();

        assert!(last.sma_20.is_some());
        assert!(last.sma_50.is_some());
        assert!(last.macd.is_some());
        assert!(last.rsi_14.is_some());
        assert!(last.bb_upper.is_some());
        assert!(last.atr_14.is_some());
        assert!(last.obv.is_some());
        assert!(last.stoch_k.is_some());
        assert!(last.volume_sma_20.is_some());
    }

    #[test]
    fn test_sma_tracks_uptrend() {
        let bars = enrich(&synthetic_series(60)).unwrap();
        let last = bars.last().unwrap();

        // In a steady uptrend the short average sits above the long one
        // and both sit below the latest close.
        let sma_20 = last.sma_20.unwrap();
        let sma_50 = last.sma_50.unwrap();
        assert!(sma_20 > sma_50);
        assert!(last.close > sma_20);
    }

    #[test]
    fn test_rsi_high_in_uptrend() {
        let bars = enrich(&synthetic_series(60)).unwrap();
        let rsi = bars.last().unwrap().rsi_14.unwrap();
        assert!(rsi > 50.0, "monotonic uptrend should have RSI > 50, got {rsi}");
        assert!(rsi <= 100.0);
    }

    #[test]
    fn test_bollinger_ordering() {
        let bars = enrich(&synthetic_series(60)).unwrap();
        let last = bars.last().unwrap();
        let upper = last.bb_upper.unwrap();
        let middle = last.bb_middle.unwrap();
        let lower = last.bb_lower.unwrap();
        assert!(upper >= middle && middle >= lower);
    }

    #[test]
    fn test_inconsistent_row_is_widened_not_dropped() {
        let mut quotes = synthetic_series(30);
        // Close above the reported high
        quotes[10].close = quotes[10].high + 2.0;

        let bars = enrich(&quotes).unwrap();
        assert_eq!(bars.len(), 30);
    }
}

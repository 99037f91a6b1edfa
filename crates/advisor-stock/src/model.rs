//! Core data model for one analysis run
//!
//! Statement data is typed with explicit optional fields: the provider omits
//! line items freely, and a missing value must survive as `None` all the way
//! to the prompt's "N/A" placeholder rather than defaulting to zero.

use crate::indicators::IndicatorBar;
use crate::store::Holding;
use serde::{Deserialize, Serialize};

/// Income statement line items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub revenue: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
}

/// Balance sheet line items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub shareholders_equity: Option<f64>,
}

/// Cash flow statement line items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub operating: Option<f64>,
    pub investing: Option<f64>,
    pub financing: Option<f64>,
}

/// Per-share and profitability metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub eps: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub ebitda: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

/// Valuation ratios
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationRatios {
    pub market_cap: Option<f64>,
    pub per: Option<f64>,
    pub pbr: Option<f64>,
    pub psr: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub ev_ebitda: Option<f64>,
}

/// Growth and dividend profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthAndDividend {
    pub revenue_growth: Option<f64>,
    pub eps_growth: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
}

/// All fetched financial statement data for one symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub income_statement: IncomeStatement,
    pub balance_sheet: BalanceSheet,
    pub cash_flow: CashFlowStatement,
    pub key_metrics: KeyMetrics,
    pub valuation: ValuationRatios,
    pub growth_and_dividend: GrowthAndDividend,
}

/// Everything known about one symbol for the lifetime of an analysis run
///
/// Created once per run and never mutated afterwards. A symbol appears in at
/// most one record per run; `is_holding` is true iff a holding with the same
/// symbol exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolAnalysisRecord {
    pub symbol: String,
    pub is_favorite: bool,
    pub is_holding: bool,
    pub holding: Option<Holding>,
    /// Daily bars with derived indicators, oldest first
    pub bars: Vec<IndicatorBar>,
    pub financials: Financials,
}

impl SymbolAnalysisRecord {
    /// The most recent bar of the price series
    pub fn latest_bar(&self) -> Option<&IndicatorBar> {
        self.bars.last()
    }

    /// Unrealized per-share P&L and P&L rate in percent, for holdings
    ///
    /// Purchase at 100 with a latest close of 120 yields `(20.0, 20.0)`.
    pub fn unrealized_pnl(&self) -> Option<(f64, f64)> {
        let holding = self.holding.as_ref()?;
        let latest_close = self.latest_bar()?.close;
        let pnl = latest_close - holding.price;
        let pnl_rate = pnl / holding.price * 100.0;
        Some((pnl, pnl_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorBar;
    use chrono::NaiveDate;

    fn bar_with_close(close: f64) -> IndicatorBar {
        IndicatorBar {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
            ..IndicatorBar::default()
        }
    }

    fn record_with_holding(purchase_price: f64, latest_close: f64) -> SymbolAnalysisRecord {
        SymbolAnalysisRecord {
            symbol: "AAPL".to_string(),
            is_favorite: false,
            is_holding: true,
            holding: Some(Holding {
                symbol: "AAPL".to_string(),
                quantity: 5,
                price: purchase_price,
                purchase_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            }),
            bars: vec![bar_with_close(latest_close)],
            financials: Financials::default(),
        }
    }

    #[test]
    fn test_unrealized_pnl() {
        let record = record_with_holding(100.0, 120.0);
        let (pnl, rate) = record.unrealized_pnl().unwrap();
        assert!((pnl - 20.0).abs() < f64::EPSILON);
        assert!((rate - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pnl_requires_holding() {
        let mut record = record_with_holding(100.0, 120.0);
        record.holding = None;
        assert!(record.unrealized_pnl().is_none());
    }

    #[test]
    fn test_pnl_requires_price_series() {
        let mut record = record_with_holding(100.0, 120.0);
        record.bars.clear();
        assert!(record.unrealized_pnl().is_none());
    }
}

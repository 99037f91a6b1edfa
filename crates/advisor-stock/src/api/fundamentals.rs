//! Financial statement data via the Yahoo quoteSummary endpoint
//!
//! Yahoo wraps every figure in a `{ "raw": 123.4, "fmt": "123" }` object and
//! omits fields it has no data for, so the wire types are `Option` all the
//! way down and collapse into the typed [`Financials`] records.

use crate::error::{AdvisorError, Result};
use crate::model::{
    BalanceSheet, CashFlowStatement, Financials, GrowthAndDividend, IncomeStatement, KeyMetrics,
    ValuationRatios,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const QUOTE_SUMMARY_BASE: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const MODULES: &str = "incomeStatementHistory,balanceSheetHistory,cashflowStatementHistory,\
                       defaultKeyStatistics,financialData,summaryDetail";

/// Source of financial statement fields
///
/// Seam for the fetch stage, mirrors [`crate::api::PriceHistorySource`].
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    /// Fetch financial statement fields for a symbol
    async fn fetch(&self, symbol: &str) -> Result<Financials>;
}

/// Yahoo quoteSummary client
pub struct FundamentalsClient {
    client: Client,
}

impl FundamentalsClient {
    /// Create a client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; advisor/0.1)")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FundamentalsSource for FundamentalsClient {
    async fn fetch(&self, symbol: &str) -> Result<Financials> {
        let url = format!("{QUOTE_SUMMARY_BASE}/{symbol}");

        let response = self
            .client
            .get(&url)
            .query(&[("modules", MODULES)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AdvisorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("quoteSummary returned HTTP {}", response.status()),
            });
        }

        let body = response.text().await?;
        debug!(symbol, bytes = body.len(), "fetched quoteSummary");
        parse_quote_summary(symbol, &body)
    }
}

/// Parse a quoteSummary JSON body into typed statement records
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<Financials> {
    let wire: QuoteSummaryBody = serde_json::from_str(body)?;

    let result = wire
        .quote_summary
        .and_then(|qs| qs.result)
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.swap_remove(0))
            }
        })
        .ok_or_else(|| AdvisorError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "quoteSummary result was empty".to_string(),
        })?;

    let income = result
        .income_statement_history
        .and_then(|h| h.income_statement_history.into_iter().next());
    let balance = result
        .balance_sheet_history
        .and_then(|h| h.balance_sheet_statements.into_iter().next());
    let cashflow = result
        .cashflow_statement_history
        .and_then(|h| h.cashflow_statements.into_iter().next());
    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let summary = result.summary_detail.unwrap_or_default();

    Ok(Financials {
        income_statement: IncomeStatement {
            revenue: raw(financial.total_revenue.as_ref())
                .or_else(|| income.as_ref().and_then(|i| raw(i.total_revenue.as_ref()))),
            operating_income: income
                .as_ref()
                .and_then(|i| raw(i.operating_income.as_ref())),
            net_income: income.as_ref().and_then(|i| raw(i.net_income.as_ref())),
        },
        balance_sheet: BalanceSheet {
            total_assets: balance.as_ref().and_then(|b| raw(b.total_assets.as_ref())),
            total_liabilities: balance.as_ref().and_then(|b| raw(b.total_liab.as_ref())),
            shareholders_equity: balance
                .as_ref()
                .and_then(|b| raw(b.total_stockholder_equity.as_ref())),
        },
        cash_flow: CashFlowStatement {
            operating: cashflow
                .as_ref()
                .and_then(|c| raw(c.total_cash_from_operating_activities.as_ref())),
            investing: cashflow
                .as_ref()
                .and_then(|c| raw(c.total_cashflows_from_investing_activities.as_ref())),
            financing: cashflow
                .as_ref()
                .and_then(|c| raw(c.total_cash_from_financing_activities.as_ref())),
        },
        key_metrics: KeyMetrics {
            eps: raw(stats.trailing_eps.as_ref()),
            dividend_rate: raw(summary.dividend_rate.as_ref()),
            roe: raw(financial.return_on_equity.as_ref()),
            roa: raw(financial.return_on_assets.as_ref()),
            ebitda: raw(financial.ebitda.as_ref()),
            free_cash_flow: raw(financial.free_cashflow.as_ref()),
        },
        valuation: ValuationRatios {
            market_cap: raw(summary.market_cap.as_ref()),
            per: raw(summary.trailing_pe.as_ref()),
            pbr: raw(stats.price_to_book.as_ref()),
            psr: raw(summary.price_to_sales_trailing12_months.as_ref()),
            enterprise_value: raw(stats.enterprise_value.as_ref()),
            ev_ebitda: raw(stats.enterprise_to_ebitda.as_ref()),
        },
        growth_and_dividend: GrowthAndDividend {
            revenue_growth: raw(financial.revenue_growth.as_ref()),
            eps_growth: raw(stats.earnings_quarterly_growth.as_ref()),
            dividend_yield: raw(summary.dividend_yield.as_ref()),
            payout_ratio: raw(summary.payout_ratio.as_ref()),
        },
    })
}

fn raw(value: Option<&RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

// ============================================================================
// Wire types
// ============================================================================

/// A Yahoo `{ raw, fmt }` figure; only `raw` matters here
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(rename = "quoteSummary")]
    quote_summary: Option<QuoteSummary>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    income_statement_history: Option<IncomeStatementHistory>,
    balance_sheet_history: Option<BalanceSheetHistory>,
    cashflow_statement_history: Option<CashflowStatementHistory>,
    default_key_statistics: Option<DefaultKeyStatistics>,
    financial_data: Option<FinancialData>,
    summary_detail: Option<SummaryDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<IncomeStatementEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementEntry {
    total_revenue: Option<RawValue>,
    operating_income: Option<RawValue>,
    net_income: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetHistory {
    #[serde(default)]
    balance_sheet_statements: Vec<BalanceSheetEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetEntry {
    total_assets: Option<RawValue>,
    total_liab: Option<RawValue>,
    total_stockholder_equity: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashflowStatementHistory {
    #[serde(default)]
    cashflow_statements: Vec<CashflowEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashflowEntry {
    total_cash_from_operating_activities: Option<RawValue>,
    total_cashflows_from_investing_activities: Option<RawValue>,
    total_cash_from_financing_activities: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefaultKeyStatistics {
    trailing_eps: Option<RawValue>,
    price_to_book: Option<RawValue>,
    enterprise_value: Option<RawValue>,
    enterprise_to_ebitda: Option<RawValue>,
    earnings_quarterly_growth: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    total_revenue: Option<RawValue>,
    return_on_equity: Option<RawValue>,
    return_on_assets: Option<RawValue>,
    ebitda: Option<RawValue>,
    free_cashflow: Option<RawValue>,
    revenue_growth: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    dividend_rate: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    payout_ratio: Option<RawValue>,
    market_cap: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "priceToSalesTrailing12Months")]
    price_to_sales_trailing12_months: Option<RawValue>,
}

//! Batched analysis prompt assembly
//!
//! Symbols are rendered in sorted order and split into fixed-size batches so
//! one request never carries more than a handful of data blocks. Every batch
//! repeats the full instruction header; blocks within a batch are independent
//! and a symbol appears in exactly one batch.

use crate::format::{format_number, format_opt, format_percent};
use crate::model::SymbolAnalysisRecord;
use std::collections::BTreeMap;
use std::fmt::Write;

const INSTRUCTION_HEADER: &str = "\
Analyze the stocks below. For each stock cover:
1. Technical analysis: trend, momentum and volatility based on the listed indicators
2. Fundamental analysis: profitability, balance sheet health and cash generation
3. Valuation: whether the current price looks cheap or expensive given the ratios
4. Growth and dividends: growth trajectory and shareholder returns

For stocks I hold, conclude with a buy more / sell / hold decision.
For stocks I am only watching, conclude with a buy / hold decision.
Close with a short disclaimer that this is not financial advice.";

/// Assemble the batched analysis prompts for a run, sorted by symbol
///
/// Returns `ceil(n / batch_size)` prompts for `n` records; every prompt
/// carries the instruction header followed by at most `batch_size` data
/// blocks. An empty record set yields no prompts.
pub fn build_batch_prompts(
    records: &BTreeMap<String, SymbolAnalysisRecord>,
    batch_size: usize,
) -> Vec<String> {
    let ordered: Vec<&SymbolAnalysisRecord> = records.values().collect();

    ordered
        .chunks(batch_size.max(1))
        .map(|batch| {
            let mut prompt = String::from(INSTRUCTION_HEADER);
            for record in batch {
                prompt.push_str("\n\n");
                prompt.push_str(&symbol_block(record));
            }
            prompt
        })
        .collect()
}

/// Render one symbol's data block
fn symbol_block(record: &SymbolAnalysisRecord) -> String {
    let mut block = String::new();
    let status = if record.is_holding { "holding" } else { "watching" };
    let _ = writeln!(block, "=== {} ({status}) ===", record.symbol);

    if let Some(bar) = record.latest_bar() {
        let _ = writeln!(block, "[Price and technicals as of {}]", bar.date);
        let _ = writeln!(block, "Close: {}", format_number(bar.close));
        let _ = writeln!(block, "SMA-20: {}", format_opt(bar.sma_20));
        let _ = writeln!(block, "SMA-50: {}", format_opt(bar.sma_50));
        let _ = writeln!(block, "RSI-14: {}", format_opt(bar.rsi_14));
        let _ = writeln!(
            block,
            "MACD: {} (signal {})",
            format_opt(bar.macd),
            format_opt(bar.macd_signal)
        );
        let _ = writeln!(
            block,
            "Bollinger upper/lower: {} / {}",
            format_opt(bar.bb_upper),
            format_opt(bar.bb_lower)
        );
    } else {
        let _ = writeln!(block, "[Price data unavailable]");
    }

    let fin = &record.financials;
    let _ = writeln!(block, "[Financials]");
    let _ = writeln!(block, "Revenue: {}", format_opt(fin.income_statement.revenue));
    let _ = writeln!(
        block,
        "Operating income: {}",
        format_opt(fin.income_statement.operating_income)
    );
    let _ = writeln!(
        block,
        "Total assets: {} / Total liabilities: {}",
        format_opt(fin.balance_sheet.total_assets),
        format_opt(fin.balance_sheet.total_liabilities)
    );
    let _ = writeln!(
        block,
        "Operating CF: {} / Investing CF: {}",
        format_opt(fin.cash_flow.operating),
        format_opt(fin.cash_flow.investing)
    );
    let _ = writeln!(block, "EPS: {}", format_opt(fin.key_metrics.eps));
    let _ = writeln!(block, "ROE: {}", format_percent(fin.key_metrics.roe));
    let _ = writeln!(block, "PER: {}", format_opt(fin.valuation.per));
    let _ = writeln!(block, "PBR: {}", format_opt(fin.valuation.pbr));
    let _ = writeln!(block, "EV/EBITDA: {}", format_opt(fin.valuation.ev_ebitda));
    let _ = writeln!(
        block,
        "Revenue growth: {}",
        format_percent(fin.growth_and_dividend.revenue_growth)
    );
    let _ = writeln!(
        block,
        "EPS growth: {}",
        format_percent(fin.growth_and_dividend.eps_growth)
    );
    let _ = writeln!(
        block,
        "Dividend yield: {} / Payout ratio: {}",
        format_percent(fin.growth_and_dividend.dividend_yield),
        format_percent(fin.growth_and_dividend.payout_ratio)
    );

    if let Some(holding) = &record.holding {
        let _ = writeln!(block, "[My position]");
        let _ = writeln!(
            block,
            "Quantity: {} / Purchase price: {} / Purchased: {}",
            holding.quantity,
            format_number(holding.price),
            holding.purchase_date
        );
        if let Some((pnl, pnl_rate)) = record.unrealized_pnl() {
            let _ = writeln!(
                block,
                "Unrealized P&L per share: {} ({pnl_rate:.2}%)",
                format_number(pnl)
            );
        }
    }

    block.trim_end().to_string()
}

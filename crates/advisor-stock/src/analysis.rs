//! The fetch-and-derive stage of a run
//!
//! Symbols are processed one at a time. A symbol whose price history,
//! financials or indicator derivation fails is skipped with a warning; one
//! failing symbol never aborts the run.

use crate::api::{FundamentalsSource, PriceHistorySource, Quote};
use crate::error::Result;
use crate::indicators;
use crate::model::{Financials, SymbolAnalysisRecord};
use crate::store::Holding;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Assemble one symbol's record from already-fetched inputs
///
/// Pure combination step: derives the indicator battery from the raw series
/// and attaches membership flags and the matching holding, if any.
pub fn combine_symbol(
    symbol: &str,
    quotes: &[Quote],
    financials: Financials,
    favorites: &[String],
    holdings: &[Holding],
) -> Result<SymbolAnalysisRecord> {
    let bars = indicators::enrich(quotes)?;
    let holding = holdings.iter().find(|h| h.symbol == symbol).cloned();

    Ok(SymbolAnalysisRecord {
        symbol: symbol.to_string(),
        is_favorite: favorites.iter().any(|f| f == symbol),
        is_holding: holding.is_some(),
        holding,
        bars,
        financials,
    })
}

/// Fetch and derive records for every symbol of a session, fail-soft
///
/// Processes symbols sequentially in the order given, pulling from the
/// injected price and fundamentals sources. Returns the records keyed by
/// symbol; symbols that could not produce both a price series and
/// financials are absent from the map.
pub async fn build_analysis_set(
    market: &dyn PriceHistorySource,
    fundamentals: &dyn FundamentalsSource,
    history_days: i64,
    symbols: &[String],
    favorites: &[String],
    holdings: &[Holding],
) -> Result<BTreeMap<String, SymbolAnalysisRecord>> {
    let mut records = BTreeMap::new();

    for symbol in symbols {
        let quotes = match market.daily_history(symbol, history_days).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(symbol, error = %e, "skipping symbol: price history unavailable");
                continue;
            }
        };

        let financials = match fundamentals.fetch(symbol).await {
            Ok(financials) => financials,
            Err(e) => {
                warn!(symbol, error = %e, "skipping symbol: financials unavailable");
                continue;
            }
        };

        match combine_symbol(symbol, &quotes, financials, favorites, holdings) {
            Ok(record) => {
                records.insert(symbol.clone(), record);
            }
            Err(e) => {
                warn!(symbol, error = %e, "skipping symbol: indicator derivation failed");
            }
        }
    }

    info!(
        requested = symbols.len(),
        fetched = records.len(),
        "fetch stage complete"
    );
    Ok(records)
}

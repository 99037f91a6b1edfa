//! Human-readable numeric formatting for prompt blocks
//!
//! Large statement figures collapse into suffixed magnitudes so the model
//! sees "2.30B" instead of eleven digits. Formatting is deterministic:
//! equal inputs always render the same string.

/// Placeholder rendered for values the provider did not return
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a number with magnitude suffixes and two-decimal precision
///
/// `abs >= 1e9` renders in billions ("2.30B"), `abs >= 1e6` in millions
/// ("1.50M"), anything smaller as a plain two-decimal number.
pub fn format_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else {
        format!("{value:.2}")
    }
}

/// Format an optional number, substituting the fixed placeholder when absent
pub fn format_opt(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_number)
}

/// Format a ratio as a percentage with two decimals ("12.34%")
pub fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |v| format!("{:.2}%", v * 100.0),
    )
}

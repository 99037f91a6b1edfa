//! Error types for advisor operations

use crate::session::Page;
use thiserror::Error;

/// Advisor specific errors
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinance(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hosted model error
    #[error("Model error: {0}")]
    Llm(#[from] advisor_llm::LlmError),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    Indicator(String),

    /// Preference store error
    #[error("Store error: {0}")]
    Store(String),

    /// Disallowed page transition
    #[error("Invalid page transition: {from:?} -> {to:?}")]
    InvalidTransition { from: Page, to: Page },

    /// Chat entered without a completed analysis
    #[error("No completed analysis to chat about")]
    MissingAnalysis,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

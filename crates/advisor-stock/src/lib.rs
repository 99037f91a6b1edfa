//! Interactive stock analysis advisor
//!
//! Walks a session through a fixed workflow: manage favorites and holdings,
//! fetch six months of daily prices with a technical indicator battery and
//! financial statements, pick an investor persona, run a batched model
//! analysis, then chat about the result. Preferences persist across sessions
//! in an encrypted store.
//!
//! # Architecture
//!
//! - [`store`]: encrypted on-disk favorites and holdings
//! - [`session`]: per-session state and the page transition table
//! - [`api`] / [`indicators`] / [`analysis`]: the fail-soft fetch stage
//! - [`prompts`]: persona system texts and batched prompt assembly
//! - [`engine`]: model-backed analysis runs and follow-up chat

pub mod analysis;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod indicators;
pub mod model;
pub mod prompts;
pub mod session;
pub mod store;

pub use analysis::{build_analysis_set, combine_symbol};
pub use api::{FundamentalsSource, PriceHistorySource};
pub use config::AdvisorConfig;
pub use engine::AdvisorEngine;
pub use error::{AdvisorError, Result};
pub use model::{Financials, SymbolAnalysisRecord};
pub use prompts::Persona;
pub use session::{Page, Session};
pub use store::{Holding, PreferenceStore};

//! External market-data clients

pub mod fundamentals;
pub mod market;

pub use fundamentals::{FundamentalsClient, FundamentalsSource};
pub use market::{MarketDataClient, PriceHistorySource, Quote};

//! Service layer: market data acquisition and the refresh loop

pub mod quotes;
pub mod refresher;

pub use quotes::{CachedQuotes, HttpQuoteProvider, QuoteError, QuoteProvider};
pub use refresher::{refresh_portfolio, run_watch, RefreshReport};

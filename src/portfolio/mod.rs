//! Portfolio model and valuation engine
//!
//! Position-level accounting (weighted cost basis, bounded price history,
//! split rebasing, threshold alerts), the portfolio aggregate, and the
//! persistence codec around them.

pub mod alerts;
pub mod book;
pub mod codec;
pub mod display;
pub mod position;
pub mod storage;

pub use alerts::{Alert, AlertKind};
pub use book::Portfolio;
pub use position::{
    PerformanceMetrics, Position, PricePoint, PriceRange, PriceTick, MAX_PRICE_HISTORY,
};
pub use storage::PortfolioStorage;

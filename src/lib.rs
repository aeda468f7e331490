//! stockbot: CLI stock portfolio tracker
//!
//! The portfolio module is the valuation engine: positions with blended
//! cost basis, bounded price history, split rebasing and one-shot alerts.
//! Services feed it market ticks; the CLI is the thin shell around both.

pub mod cli;
pub mod data_paths;
pub mod errors;
pub mod helpers;
pub mod logging;
pub mod portfolio;
pub mod services;

//! Auto-refresh loop with alert notifications

use anyhow::{anyhow, Result};
use clap::Args;

use crate::data_paths::DataPaths;
use crate::portfolio::PortfolioStorage;
use crate::services::quotes::{CachedQuotes, HttpQuoteProvider};
use crate::services::refresher::run_watch;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Refresh interval in seconds (minimum 5)
    #[arg(long, default_value_t = 60)]
    pub interval: u64,
}

pub async fn execute(args: WatchArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let mut portfolio = storage
        .load()?
        .ok_or_else(|| anyhow!("No portfolio found. Run 'stockbot add' first"))?;

    if portfolio.is_empty() {
        println!("📭 Portfolio is empty, nothing to watch");
        return Ok(());
    }

    let mut provider = CachedQuotes::new(HttpQuoteProvider::new());
    run_watch(&mut portfolio, &mut provider, &storage, args.interval).await
}

//! Remove a holding entirely (full liquidation)

use anyhow::Result;
use clap::Args;

use crate::data_paths::DataPaths;
use crate::portfolio::PortfolioStorage;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Stock symbol to remove
    pub symbol: String,
}

pub async fn execute(args: RemoveArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let mut portfolio = storage.load()?.unwrap_or_default();

    if portfolio.remove_stock(&args.symbol) {
        storage.save(&portfolio)?;
        println!("🗑️  Removed {}", args.symbol.to_uppercase());
        println!("📊 Portfolio now holds {} position(s)", portfolio.len());
    } else {
        println!("❌ No position in {}", args.symbol.to_uppercase());
    }

    Ok(())
}

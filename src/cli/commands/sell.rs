//! Sell shares of an existing position

use anyhow::{anyhow, Result};
use clap::Args;
use rust_decimal::Decimal;

use crate::data_paths::DataPaths;
use crate::helpers::parse_positive_decimal;
use crate::portfolio::PortfolioStorage;

#[derive(Args, Debug)]
pub struct SellArgs {
    /// Stock symbol
    pub symbol: String,

    /// Number of shares to sell (clamped to the held quantity)
    #[arg(value_parser = parse_positive_decimal)]
    pub quantity: Decimal,
}

pub async fn execute(args: SellArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let mut portfolio = storage
        .load()?
        .ok_or_else(|| anyhow!("No portfolio found. Run 'stockbot add' first"))?;

    let position = portfolio
        .get_stock_mut(&args.symbol)
        .ok_or_else(|| anyhow!("No position in {}", args.symbol.to_uppercase()))?;

    position.remove_quantity(args.quantity);
    let symbol = position.symbol.clone();
    let remaining = position.quantity;
    storage.save(&portfolio)?;

    if remaining.is_zero() {
        println!("✅ Sold out of {} (position kept; 'stockbot remove' deletes it)", symbol);
    } else {
        println!("✅ Sold {} {}, {} shares remaining", args.quantity.normalize(), symbol, remaining.normalize());
    }

    Ok(())
}

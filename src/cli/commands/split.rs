//! Apply a stock split to a position

use anyhow::{anyhow, Result};
use clap::Args;
use rust_decimal::Decimal;

use crate::data_paths::DataPaths;
use crate::helpers::format_currency;
use crate::portfolio::PortfolioStorage;

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Stock symbol
    pub symbol: String,

    /// Split ratio, e.g. 2 for a 2-for-1 split, 0.5 for a reverse split
    pub ratio: Decimal,
}

pub async fn execute(args: SplitArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let mut portfolio = storage
        .load()?
        .ok_or_else(|| anyhow!("No portfolio found. Run 'stockbot add' first"))?;

    let position = portfolio
        .get_stock_mut(&args.symbol)
        .ok_or_else(|| anyhow!("No position in {}", args.symbol.to_uppercase()))?;

    position.split(args.ratio)?;
    let symbol = position.symbol.clone();
    let quantity = position.quantity;
    let price = position.current_price;
    storage.save(&portfolio)?;

    println!(
        "✅ Applied {}:1 split to {}: {} shares @ {}",
        args.ratio.normalize(),
        symbol,
        quantity.normalize(),
        format_currency(price)
    );
    println!("   Historical prices were rebased so comparisons stay valid");

    Ok(())
}

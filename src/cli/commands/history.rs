//! Show a position's recent price history

use anyhow::{anyhow, Result};
use clap::Args;

use crate::data_paths::DataPaths;
use crate::portfolio::{display, PortfolioStorage};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Stock symbol
    pub symbol: String,

    /// How many days back to show
    #[arg(long, default_value_t = 7)]
    pub days: i64,
}

pub async fn execute(args: HistoryArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let portfolio = storage
        .load()?
        .ok_or_else(|| anyhow!("No portfolio found. Run 'stockbot add' first"))?;

    let position = portfolio
        .get_stock(&args.symbol)
        .ok_or_else(|| anyhow!("No position in {}", args.symbol.to_uppercase()))?;

    print!("{}", display::history_table(position, args.days));
    Ok(())
}

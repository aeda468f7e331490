//! Buy more shares of an existing position

use anyhow::{anyhow, Result};
use clap::Args;
use rust_decimal::Decimal;

use crate::data_paths::DataPaths;
use crate::helpers::{format_currency, parse_positive_decimal};
use crate::portfolio::PortfolioStorage;

#[derive(Args, Debug)]
pub struct BuyArgs {
    /// Stock symbol
    pub symbol: String,

    /// Number of shares to buy
    #[arg(value_parser = parse_positive_decimal)]
    pub quantity: Decimal,

    /// Execution price per share (defaults to the current market price)
    #[arg(long, value_parser = parse_positive_decimal)]
    pub price: Option<Decimal>,
}

pub async fn execute(args: BuyArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let mut portfolio = storage
        .load()?
        .ok_or_else(|| anyhow!("No portfolio found. Run 'stockbot add' first"))?;

    let position = portfolio
        .get_stock_mut(&args.symbol)
        .ok_or_else(|| anyhow!("No position in {}. Use 'stockbot add' to open one", args.symbol.to_uppercase()))?;

    position.add_quantity(args.quantity, args.price);
    let symbol = position.symbol.clone();
    let quantity = position.quantity;
    let basis = position.purchase_price;
    storage.save(&portfolio)?;

    println!(
        "✅ Bought {} {}, now {} shares, blended cost basis {}",
        args.quantity.normalize(),
        symbol,
        quantity.normalize(),
        format_currency(basis)
    );

    Ok(())
}

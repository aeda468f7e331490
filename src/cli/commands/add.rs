//! Add shares of a symbol to the portfolio

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;

use crate::data_paths::DataPaths;
use crate::helpers::{format_currency, parse_positive_decimal};
use crate::portfolio::PortfolioStorage;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Stock symbol (1-5 letters)
    pub symbol: String,

    /// Number of shares
    #[arg(value_parser = parse_positive_decimal)]
    pub quantity: Decimal,

    /// Price per share
    #[arg(value_parser = parse_positive_decimal)]
    pub price: Decimal,

    /// Attach a free-form note to the position
    #[arg(long)]
    pub notes: Option<String>,
}

pub async fn execute(args: AddArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let mut portfolio = storage.load()?.unwrap_or_default();

    portfolio.add_stock(&args.symbol, args.quantity, args.price)?;
    if let Some(notes) = args.notes {
        if let Some(position) = portfolio.get_stock_mut(&args.symbol) {
            position.notes = notes;
        }
    }
    storage.save(&portfolio)?;

    if let Some(position) = portfolio.get_stock(&args.symbol) {
        println!(
            "✅ {}: {} shares @ {} (cost basis {})",
            position.symbol,
            position.quantity.normalize(),
            format_currency(args.price),
            format_currency(position.purchase_price)
        );
    }
    println!("📊 Portfolio now holds {} position(s)", portfolio.len());

    Ok(())
}

//! One-shot refresh: fetch a quote for every position and update it

use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Utc};
use clap::Args;
use owo_colors::OwoColorize;

use crate::data_paths::DataPaths;
use crate::portfolio::{display, PortfolioStorage};
use crate::services::quotes::{CachedQuotes, HttpQuoteProvider};
use crate::services::refresher::refresh_portfolio;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn execute(_args: RefreshArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let mut portfolio = storage
        .load()?
        .ok_or_else(|| anyhow!("No portfolio found. Run 'stockbot add' first"))?;

    if portfolio.is_empty() {
        println!("📭 Portfolio is empty, nothing to refresh");
        return Ok(());
    }

    let mut provider = CachedQuotes::new(HttpQuoteProvider::new());
    // Same midnight anchor as 'show' so the day column reads consistently
    let anchor = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let report = refresh_portfolio(&mut portfolio, &mut provider).await;
    storage.save(&portfolio)?;

    for (symbol, alert) in &report.triggered {
        println!(
            "{} {}: {}",
            "🔔 ALERT".bright_yellow().bold(),
            symbol.bright_cyan(),
            alert.message
        );
    }
    if !report.failed.is_empty() {
        println!("⚠️  No quote for: {}", report.failed.join(", "));
    }

    print!("{}", display::dashboard(&portfolio, anchor));
    Ok(())
}

//! Show the portfolio dashboard or one position's full metrics

use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Utc};
use clap::Args;

use crate::data_paths::DataPaths;
use crate::portfolio::{display, PortfolioStorage};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Show the full performance panel for one symbol instead
    #[arg(long)]
    pub metrics: Option<String>,
}

pub async fn execute(args: ShowArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let portfolio = match storage.load()? {
        Some(portfolio) => portfolio,
        None => {
            println!("📭 No portfolio yet. Add a position with 'stockbot add <SYMBOL> <QTY> <PRICE>'");
            return Ok(());
        }
    };

    // Day figures anchor at midnight UTC; the watch loop uses its own
    // session start instead
    let anchor = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

    match args.metrics {
        Some(symbol) => {
            let position = portfolio
                .get_stock(&symbol)
                .ok_or_else(|| anyhow!("No position in {}", symbol.to_uppercase()))?;
            print!("{}", display::metrics_panel(&position.performance_metrics(anchor)));
            if !position.notes.is_empty() {
                println!("Notes: {}", position.notes);
            }
        }
        None => {
            print!("{}", display::dashboard(&portfolio, anchor));
        }
    }

    Ok(())
}

//! Export the portfolio as CSV

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

use crate::data_paths::DataPaths;
use crate::portfolio::PortfolioStorage;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (default: data/exports/portfolio-<date>.csv)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: ExportArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths.clone());
    let portfolio = storage
        .load()?
        .ok_or_else(|| anyhow!("No portfolio found. Run 'stockbot add' first"))?;

    let path = args.output.unwrap_or_else(|| {
        data_paths
            .exports()
            .join(format!("portfolio-{}.csv", Utc::now().format("%Y-%m-%d")))
    });

    storage.export_csv(&portfolio, &path)?;
    println!("📁 Exported {} position(s) to {}", portfolio.len(), path.display());
    Ok(())
}

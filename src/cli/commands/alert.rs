//! Manage price alerts

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use crate::data_paths::DataPaths;
use crate::helpers::parse_positive_decimal;
use crate::portfolio::{display, AlertKind, PortfolioStorage};

#[derive(Args, Debug)]
pub struct AlertArgs {
    #[command(subcommand)]
    pub command: AlertCommands,
}

#[derive(Subcommand, Debug)]
pub enum AlertCommands {
    /// Attach a one-shot alert to a position
    Add {
        /// Stock symbol
        symbol: String,

        /// Alert kind: above, below or change-percent
        #[arg(value_parser = parse_alert_kind)]
        kind: AlertKind,

        /// Price level, or percent for change-percent alerts
        #[arg(value_parser = parse_positive_decimal)]
        threshold: Decimal,

        /// Custom notification message
        #[arg(long)]
        message: Option<String>,
    },

    /// List configured alerts
    List,
}

fn parse_alert_kind(s: &str) -> Result<AlertKind, String> {
    match s.to_lowercase().as_str() {
        "above" => Ok(AlertKind::Above),
        "below" => Ok(AlertKind::Below),
        "change-percent" | "change_percent" | "changepercent" => Ok(AlertKind::ChangePercent),
        other => Err(format!(
            "'{}' is not an alert kind (expected above, below or change-percent)",
            other
        )),
    }
}

pub async fn execute(args: AlertArgs, data_paths: DataPaths) -> Result<()> {
    let storage = PortfolioStorage::new(data_paths);
    let mut portfolio = storage
        .load()?
        .ok_or_else(|| anyhow!("No portfolio found. Run 'stockbot add' first"))?;

    match args.command {
        AlertCommands::Add {
            symbol,
            kind,
            threshold,
            message,
        } => {
            let position = portfolio
                .get_stock_mut(&symbol)
                .ok_or_else(|| anyhow!("No position in {}", symbol.to_uppercase()))?;
            position.add_alert(kind, threshold, message);
            let text = position.alerts.last().map(|a| a.message.clone()).unwrap_or_default();
            storage.save(&portfolio)?;
            println!("🔔 Alert armed: {}", text);
        }
        AlertCommands::List => {
            print!("{}", display::alerts_table(&portfolio));
        }
    }

    Ok(())
}

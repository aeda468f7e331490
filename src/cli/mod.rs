//! CLI module for stockbot
//!
//! Command-line interface for the portfolio tracker. Uses clap for
//! argument parsing and a structured command pattern: each command file
//! owns its Args struct and an execute function.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{self, LogMode, LoggingConfig};

use commands::add::AddArgs;
use commands::alert::AlertArgs;
use commands::buy::BuyArgs;
use commands::export::ExportArgs;
use commands::history::HistoryArgs;
use commands::refresh::RefreshArgs;
use commands::remove::RemoveArgs;
use commands::sell::SellArgs;
use commands::show::ShowArgs;
use commands::split::SplitArgs;
use commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "stockbot")]
#[command(version)]
#[command(about = "CLI stock portfolio tracker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add shares of a symbol to the portfolio
    Add(AddArgs),

    /// Remove a holding entirely
    Remove(RemoveArgs),

    /// Buy more shares of an existing position
    Buy(BuyArgs),

    /// Sell shares of an existing position
    Sell(SellArgs),

    /// Apply a stock split to a position
    Split(SplitArgs),

    /// Manage price alerts
    Alert(AlertArgs),

    /// Show the portfolio dashboard
    Show(ShowArgs),

    /// Show a position's recent price history
    History(HistoryArgs),

    /// Fetch fresh quotes once and update every position
    Refresh(RefreshArgs),

    /// Auto-refresh on an interval with alert notifications
    Watch(WatchArgs),

    /// Export the portfolio as CSV
    Export(ExportArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let data_paths = DataPaths::new(&self.data_dir);

        // Ensure all directories exist
        data_paths.ensure_directories()?;

        // -v bumps the default log level; RUST_LOG still wins
        if self.verbose > 0 && std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "debug");
        }

        // The watch loop owns the console; everything else logs to both
        let mode = match self.command {
            Commands::Watch(_) => LogMode::FileOnly,
            _ => LogMode::ConsoleAndFile,
        };
        logging::init_logging(LoggingConfig::new(mode, data_paths.clone()))?;

        match self.command {
            Commands::Add(args) => commands::add::execute(args, data_paths).await,
            Commands::Remove(args) => commands::remove::execute(args, data_paths).await,
            Commands::Buy(args) => commands::buy::execute(args, data_paths).await,
            Commands::Sell(args) => commands::sell::execute(args, data_paths).await,
            Commands::Split(args) => commands::split::execute(args, data_paths).await,
            Commands::Alert(args) => commands::alert::execute(args, data_paths).await,
            Commands::Show(args) => commands::show::execute(args, data_paths).await,
            Commands::History(args) => commands::history::execute(args, data_paths).await,
            Commands::Refresh(args) => commands::refresh::execute(args, data_paths).await,
            Commands::Watch(args) => commands::watch::execute(args, data_paths).await,
            Commands::Export(args) => commands::export::execute(args, data_paths).await,
        }
    }
}

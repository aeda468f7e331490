//! Portfolio persistence layer
//!
//! The current portfolio lives in: data/portfolio/current.json
//! CSV exports land in: data/exports/
//!
//! A missing portfolio file is not an error ("no prior portfolio found");
//! a malformed one is, and the decision what to do about it stays with the
//! caller.

use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::Path;
use tracing::info;

use crate::data_paths::DataPaths;
use crate::errors::FormatError;
use crate::portfolio::book::Portfolio;
use crate::portfolio::codec;

/// Portfolio storage manager
#[derive(Clone)]
pub struct PortfolioStorage {
    data_paths: DataPaths,
}

impl PortfolioStorage {
    pub fn new(data_paths: DataPaths) -> Self {
        Self { data_paths }
    }

    /// Save the current portfolio, overwriting any previous state
    pub fn save(&self, portfolio: &Portfolio) -> Result<()> {
        self.data_paths
            .ensure_directories()
            .context("Failed to create data directories")?;

        let structure = serde_json::json!({
            "saved_at": Utc::now().to_rfc3339(),
            "positions": portfolio
                .positions()
                .map(codec::to_structure)
                .collect::<Vec<_>>(),
        });
        let json = serde_json::to_string_pretty(&structure)?;

        let filepath = self.data_paths.portfolio_file();
        std::fs::write(&filepath, json)
            .context("Failed to write portfolio file")?;

        info!(
            positions = portfolio.len(),
            file = %filepath.display(),
            "Saved portfolio"
        );
        Ok(())
    }

    /// Load the current portfolio. `Ok(None)` when no file exists yet;
    /// decode failures propagate to the caller.
    pub fn load(&self) -> Result<Option<Portfolio>> {
        let filepath = self.data_paths.portfolio_file();
        if !filepath.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&filepath)
            .context("Failed to read portfolio file")?;
        let structure: Value = serde_json::from_str(&content)
            .context("Portfolio file is not valid JSON")?;

        let entries = structure
            .get("positions")
            .and_then(|v| v.as_array())
            .ok_or(FormatError::MissingField("positions"))?;

        let positions = entries
            .iter()
            .map(codec::from_structure)
            .collect::<Result<Vec<_>, FormatError>>()?;

        info!(
            positions = positions.len(),
            file = %filepath.display(),
            "Loaded portfolio"
        );
        Ok(Some(Portfolio::from_positions(positions)))
    }

    /// Export the portfolio as CSV, one row per position plus a TOTAL row
    pub fn export_csv(&self, portfolio: &Portfolio, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)
            .context("Failed to create CSV file")?;

        writer.write_record([
            "Symbol",
            "Quantity",
            "Initial Price",
            "Current Price",
            "Value",
            "Change",
            "Change %",
            "Last Updated",
        ])?;

        let mut total_value = Decimal::ZERO;
        for position in portfolio.positions() {
            let value = position.current_value();
            total_value += value;
            writer.write_record([
                position.symbol.clone(),
                position.quantity.to_string(),
                position.initial_price.to_string(),
                position.current_price.to_string(),
                value.to_string(),
                position.change.to_string(),
                position.change_percent.round_dp(4).to_string(),
                position.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])?;
        }

        writer.write_record([
            "TOTAL".to_string(),
            String::new(),
            String::new(),
            String::new(),
            total_value.to_string(),
            String::new(),
            String::new(),
            Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        ])?;

        writer.flush()?;
        info!(file = %path.display(), positions = portfolio.len(), "Exported portfolio CSV");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn storage() -> (TempDir, PortfolioStorage) {
        let dir = TempDir::new().unwrap();
        let storage = PortfolioStorage::new(DataPaths::new(dir.path()));
        (dir, storage)
    }

    fn sample_portfolio() -> Portfolio {
        let mut portfolio = Portfolio::new();
        portfolio.add_stock("AAPL", dec!(10), dec!(150.25)).unwrap();
        portfolio.add_stock("MSFT", dec!(5), dec!(300)).unwrap();
        portfolio
            .get_stock_mut("AAPL")
            .unwrap()
            .update_price(dec!(155.5), Some(100), None, None);
        portfolio
    }

    #[test]
    fn test_load_missing_returns_none() {
        let (_dir, storage) = storage();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, storage) = storage();
        let portfolio = sample_portfolio();

        storage.save(&portfolio).unwrap();
        let loaded = storage.load().unwrap().unwrap();

        assert_eq!(loaded, portfolio);
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let (_dir, storage) = storage();
        storage.save(&sample_portfolio()).unwrap();
        std::fs::write(storage.data_paths.portfolio_file(), "{\"positions\": [{}]}").unwrap();
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_csv_export_has_total_row() {
        let (dir, storage) = storage();
        let portfolio = sample_portfolio();
        let path = dir.path().join("exports").join("out.csv");

        storage.export_csv(&portfolio, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4); // header + 2 positions + total
        assert!(lines[0].starts_with("Symbol,Quantity"));
        assert!(lines[1].starts_with("AAPL,10,150.25,155.5,1555"));
        assert!(lines[3].starts_with("TOTAL,,,,3055"));
    }
}

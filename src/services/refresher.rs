//! Portfolio refresh loop
//!
//! Pulls one tick per held symbol from a quote provider, feeds it to the
//! engine, evaluates alerts and surfaces the newly triggered ones. A fetch
//! failure skips that symbol; the rest of the portfolio still updates.

use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use std::time::Duration;
use tracing::{info, warn};

use crate::helpers::format_currency;
use crate::portfolio::alerts::Alert;
use crate::portfolio::book::Portfolio;
use crate::portfolio::storage::PortfolioStorage;
use crate::services::quotes::QuoteProvider;

/// Outcome of one refresh pass
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Symbols whose position was updated
    pub updated: Vec<String>,
    /// Symbols whose quote fetch failed
    pub failed: Vec<String>,
    /// Newly triggered alerts, paired with their symbol
    pub triggered: Vec<(String, Alert)>,
}

/// Refresh every position once
pub async fn refresh_portfolio<P: QuoteProvider + Send>(
    portfolio: &mut Portfolio,
    provider: &mut P,
) -> RefreshReport {
    let mut report = RefreshReport::default();

    for symbol in portfolio.symbols() {
        match provider.fetch(&symbol).await {
            Ok(tick) => {
                if let Some(position) = portfolio.get_stock_mut(&symbol) {
                    position.apply_tick(&tick);
                    for alert in position.check_alerts() {
                        info!(symbol = %symbol, message = %alert.message, "Alert triggered");
                        report.triggered.push((symbol.clone(), alert));
                    }
                    report.updated.push(symbol);
                }
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Failed to fetch quote, skipping");
                report.failed.push(symbol);
            }
        }
    }

    info!(
        updated = report.updated.len(),
        failed = report.failed.len(),
        triggered = report.triggered.len(),
        "Refresh pass complete"
    );
    report
}

/// Auto-refresh loop: refresh, notify, persist, sleep; Ctrl-C exits.
///
/// The session anchor for the day gain figures is captured once at loop
/// start; daily high/low and volume restart with the session.
pub async fn run_watch<P: QuoteProvider + Send>(
    portfolio: &mut Portfolio,
    provider: &mut P,
    storage: &PortfolioStorage,
    interval_secs: u64,
) -> Result<()> {
    let session_anchor = Utc::now();
    for position in portfolio.positions_mut() {
        position.reset_daily_metrics();
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(5)));
    info!(interval_secs, "Watch loop started");
    println!(
        "👀 Watching {} position(s), refreshing every {}s. Ctrl-C to stop.\n",
        portfolio.len(),
        interval_secs.max(5)
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = refresh_portfolio(portfolio, provider).await;

                for (symbol, alert) in &report.triggered {
                    println!(
                        "{} {}: {}",
                        "🔔 ALERT".bright_yellow().bold(),
                        symbol.bright_cyan(),
                        alert.message
                    );
                }

                let day_gain: rust_decimal::Decimal = portfolio
                    .positions()
                    .map(|p| p.gain_loss_since(session_anchor).0)
                    .sum();
                println!(
                    "{}  value {}  day {}  ({} updated, {} failed)",
                    Utc::now().format("%H:%M:%S"),
                    format_currency(portfolio.total_value()),
                    format_currency(day_gain),
                    report.updated.len(),
                    report.failed.len()
                );

                storage.save(portfolio)?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Watch loop interrupted");
                println!("\n🛑 Stopping watch");
                break;
            }
        }
    }

    storage.save(portfolio)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::alerts::AlertKind;
    use crate::portfolio::position::PriceTick;
    use crate::services::quotes::QuoteError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    /// Provider with a fixed price per symbol; unknown symbols fail
    struct TableProvider {
        prices: HashMap<String, Decimal>,
    }

    impl TableProvider {
        fn new(entries: &[(&str, Decimal)]) -> Self {
            Self {
                prices: entries
                    .iter()
                    .map(|(s, p)| (s.to_string(), *p))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl QuoteProvider for TableProvider {
        fn name(&self) -> &str {
            "table"
        }

        async fn fetch(&mut self, symbol: &str) -> Result<PriceTick, QuoteError> {
            self.prices
                .get(symbol)
                .map(|p| PriceTick::price_only(*p))
                .ok_or_else(|| QuoteError::UnknownSymbol(symbol.to_string()))
        }
    }

    #[tokio::test]
    async fn test_refresh_updates_all_positions() {
        let mut portfolio = Portfolio::new();
        portfolio.add_stock("AAPL", dec!(10), dec!(100)).unwrap();
        portfolio.add_stock("MSFT", dec!(5), dec!(200)).unwrap();
        let mut provider = TableProvider::new(&[("AAPL", dec!(110)), ("MSFT", dec!(190))]);

        let report = refresh_portfolio(&mut portfolio, &mut provider).await;

        assert_eq!(report.updated, vec!["AAPL", "MSFT"]);
        assert!(report.failed.is_empty());
        assert_eq!(
            portfolio.get_stock("AAPL").unwrap().current_price,
            dec!(110)
        );
        assert_eq!(portfolio.total_value(), dec!(2050));
    }

    #[tokio::test]
    async fn test_refresh_skips_failed_symbols() {
        let mut portfolio = Portfolio::new();
        portfolio.add_stock("AAPL", dec!(10), dec!(100)).unwrap();
        portfolio.add_stock("GONE", dec!(1), dec!(50)).unwrap();
        let mut provider = TableProvider::new(&[("AAPL", dec!(105))]);

        let report = refresh_portfolio(&mut portfolio, &mut provider).await;

        assert_eq!(report.updated, vec!["AAPL"]);
        assert_eq!(report.failed, vec!["GONE"]);
        // The failed position keeps its last known price
        assert_eq!(portfolio.get_stock("GONE").unwrap().current_price, dec!(50));
    }

    #[tokio::test]
    async fn test_refresh_surfaces_triggered_alerts_once() {
        let mut portfolio = Portfolio::new();
        portfolio.add_stock("AAPL", dec!(10), dec!(100)).unwrap();
        portfolio
            .get_stock_mut("AAPL")
            .unwrap()
            .add_alert(AlertKind::Above, dec!(105), None);
        let mut provider = TableProvider::new(&[("AAPL", dec!(110))]);

        let first = refresh_portfolio(&mut portfolio, &mut provider).await;
        assert_eq!(first.triggered.len(), 1);
        assert_eq!(first.triggered[0].0, "AAPL");

        // Latched: a second pass above the threshold stays quiet
        let second = refresh_portfolio(&mut portfolio, &mut provider).await;
        assert!(second.triggered.is_empty());
    }
}

//! Portfolio display utilities and formatters
//!
//! Table and dashboard rendering for the CLI. Pure reads over the
//! portfolio; all figures come from the engine's derived metrics.

use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::helpers::{format_currency, format_percentage};
use crate::portfolio::book::Portfolio;
use crate::portfolio::position::{PerformanceMetrics, Position};

/// Format all positions as a table
pub fn positions_table(portfolio: &Portfolio, anchor: DateTime<Utc>) -> String {
    if portfolio.is_empty() {
        return "No positions found.\n".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Symbol", "Shares", "Avg Cost", "Price", "Value", "Day", "Total P&L", "P&L %",
        ]);

    for position in portfolio.positions() {
        let (day_gain, _) = position.gain_loss_since(anchor);
        let total = position.total_gain_loss();

        table.add_row(vec![
            position.symbol.bright_cyan().to_string(),
            format!("{}", position.quantity.normalize()),
            format_currency(position.purchase_price),
            format_currency(position.current_price),
            format_currency(position.current_value()),
            signed_currency(day_gain),
            signed_currency(total),
            colored_percent(position.total_gain_loss_percent()),
        ]);
    }

    format!("{table}\n")
}

/// Format the complete portfolio dashboard
pub fn dashboard(portfolio: &Portfolio, anchor: DateTime<Utc>) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "═".repeat(78).bright_blue()));
    output.push_str(&format!(
        "{}\n",
        "📈 STOCK PORTFOLIO".bright_white().bold()
    ));
    output.push_str(&format!("{}\n\n", "═".repeat(78).bright_blue()));

    let total_value = portfolio.total_value();
    let total_gain = portfolio.total_gain_loss();
    let day_gain: Decimal = portfolio
        .positions()
        .map(|p| p.gain_loss_since(anchor).0)
        .sum();

    output.push_str(&format!(
        "💰 Total Value: {}\n",
        format_currency(total_value).bright_green()
    ));
    output.push_str(&format!("📊 Total P&L: {}\n", signed_currency(total_gain)));
    output.push_str(&format!("📅 Day P&L: {}\n", signed_currency(day_gain)));
    output.push_str(&format!("🏷️  Positions: {}\n\n", portfolio.len()));

    output.push_str(&positions_table(portfolio, anchor));

    let armed = portfolio
        .positions()
        .flat_map(|p| p.alerts.iter())
        .filter(|a| !a.triggered)
        .count();
    let triggered = portfolio
        .positions()
        .flat_map(|p| p.alerts.iter())
        .filter(|a| a.triggered)
        .count();
    if armed + triggered > 0 {
        output.push_str(&format!(
            "\n🔔 Alerts: {} armed, {} triggered\n",
            armed, triggered
        ));
    }

    output
}

/// Format one position's recent price history
pub fn history_table(position: &Position, days: i64) -> String {
    let entries = position.recent_history(days);
    if entries.is_empty() {
        return format!("No price history for {} in the last {} days.\n", position.symbol, days);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Timestamp", "Price", "Change", "Change %"]);

    for point in &entries {
        table.add_row(vec![
            point.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            format_currency(point.price),
            signed_currency(point.change),
            colored_percent(point.change_percent),
        ]);
    }

    format!(
        "{}: {} entries over the last {} days\n{table}\n",
        position.symbol.bright_cyan(),
        entries.len(),
        days
    )
}

/// Format every alert in the portfolio
pub fn alerts_table(portfolio: &Portfolio) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Symbol", "Kind", "Threshold", "Message", "Status"]);

    let mut count = 0;
    for position in portfolio.positions() {
        for alert in &position.alerts {
            count += 1;
            let status = match alert.triggered_at {
                Some(at) => format!("🔔 {}", at.format("%Y-%m-%d %H:%M"))
                    .bright_yellow()
                    .to_string(),
                None => "armed".bright_green().to_string(),
            };
            table.add_row(vec![
                position.symbol.clone(),
                alert.kind.to_string(),
                alert.threshold.normalize().to_string(),
                alert.message.clone(),
                status,
            ]);
        }
    }

    if count == 0 {
        return "No alerts configured.\n".to_string();
    }
    format!("{table}\n")
}

/// Format the full metrics panel for one position
pub fn metrics_panel(metrics: &PerformanceMetrics) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}\n",
        format!("📊 {} PERFORMANCE", metrics.symbol).bright_white().bold()
    ));
    output.push_str(&format!("{}\n", "─".repeat(50).bright_black()));
    output.push_str(&format!(
        "Shares: {}   Price: {}\n",
        metrics.quantity.normalize(),
        format_currency(metrics.current_price)
    ));
    output.push_str(&format!(
        "Market Value: {}\n",
        format_currency(metrics.current_value).bright_green()
    ));
    output.push_str(&format!(
        "Cost Basis Value: {}   Initial Value: {}\n",
        format_currency(metrics.purchase_value),
        format_currency(metrics.initial_value)
    ));
    output.push_str(&format!(
        "Total P&L: {} ({})\n",
        signed_currency(metrics.total_gain_loss),
        colored_percent(metrics.total_gain_loss_percent)
    ));
    output.push_str(&format!(
        "Day P&L: {} ({})\n",
        signed_currency(metrics.day_gain_loss),
        colored_percent(metrics.day_gain_loss_percent)
    ));
    output.push_str(&format!(
        "Range: {} - {} ({}, {})\n",
        format_currency(metrics.price_range.low),
        format_currency(metrics.price_range.high),
        format_currency(metrics.price_range.range),
        format_percentage(metrics.price_range.range_percent)
    ));
    output.push_str(&format!("Volume: {}\n", metrics.volume));
    if metrics.market_cap > 0 {
        output.push_str(&format!("Market Cap: {}\n", metrics.market_cap));
    }
    if metrics.pe_ratio > Decimal::ZERO {
        output.push_str(&format!("P/E: {:.2}\n", metrics.pe_ratio));
    }
    if metrics.dividend_yield > Decimal::ZERO {
        output.push_str(&format!("Dividend Yield: {:.2}%\n", metrics.dividend_yield));
    }

    output
}

fn signed_currency(amount: Decimal) -> String {
    if amount >= Decimal::ZERO {
        format!("+{}", format_currency(amount)).bright_green().to_string()
    } else {
        format_currency(amount).bright_red().to_string()
    }
}

fn colored_percent(percent: Decimal) -> String {
    if percent >= Decimal::ZERO {
        format_percentage(percent).bright_green().to_string()
    } else {
        format_percentage(percent).bright_red().to_string()
    }
}

//! Threshold alerts and their one-shot evaluation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// What an alert watches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Fires when the price reaches or exceeds the threshold
    Above,
    /// Fires when the price reaches or drops below the threshold
    Below,
    /// Fires when the absolute percent change reaches the threshold
    ChangePercent,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::Above => write!(f, "above"),
            AlertKind::Below => write!(f, "below"),
            AlertKind::ChangePercent => write!(f, "change-percent"),
        }
    }
}

/// One-shot threshold alert attached to a position.
///
/// Once `triggered` is set the alert latches: it is skipped by every later
/// evaluation and there is no reset path.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub threshold: Decimal,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub triggered: bool,
    pub triggered_at: Option<DateTime<Utc>>,
}

/// Generated message for alerts added without one
pub fn default_message(symbol: &str, kind: AlertKind, threshold: Decimal) -> String {
    match kind {
        AlertKind::Above => format!("{} rose above {}", symbol, threshold),
        AlertKind::Below => format!("{} fell below {}", symbol, threshold),
        AlertKind::ChangePercent => format!("{} moved more than {}%", symbol, threshold),
    }
}

/// Evaluate every armed alert against the current price state.
///
/// Alerts that fire are latched (`triggered`, `triggered_at`) and returned;
/// already-triggered alerts never re-fire.
pub fn evaluate(
    alerts: &mut [Alert],
    current_price: Decimal,
    change_percent: Decimal,
) -> Vec<Alert> {
    let now = Utc::now();
    let mut fired = Vec::new();

    for alert in alerts.iter_mut().filter(|a| !a.triggered) {
        let hit = match alert.kind {
            AlertKind::Above => current_price >= alert.threshold,
            AlertKind::Below => current_price <= alert.threshold,
            AlertKind::ChangePercent => change_percent.abs() >= alert.threshold,
        };
        if hit {
            alert.triggered = true;
            alert.triggered_at = Some(now);
            fired.push(alert.clone());
        }
    }

    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn alert(kind: AlertKind, threshold: Decimal) -> Alert {
        Alert {
            kind,
            threshold,
            message: default_message("AAPL", kind, threshold),
            created_at: Utc::now(),
            triggered: false,
            triggered_at: None,
        }
    }

    #[test]
    fn test_above_fires_once() {
        let mut alerts = vec![alert(AlertKind::Above, dec!(100))];

        // Price sequence 90, 105, 95, 110: fires exactly once, at 105
        assert!(evaluate(&mut alerts, dec!(90), Decimal::ZERO).is_empty());
        let fired = evaluate(&mut alerts, dec!(105), Decimal::ZERO);
        assert_eq!(fired.len(), 1);
        assert!(fired[0].triggered);
        assert!(fired[0].triggered_at.is_some());
        assert!(evaluate(&mut alerts, dec!(95), Decimal::ZERO).is_empty());
        assert!(evaluate(&mut alerts, dec!(110), Decimal::ZERO).is_empty());
    }

    #[test]
    fn test_below_fires_at_threshold() {
        let mut alerts = vec![alert(AlertKind::Below, dec!(50))];
        assert!(evaluate(&mut alerts, dec!(51), Decimal::ZERO).is_empty());
        assert_eq!(evaluate(&mut alerts, dec!(50), Decimal::ZERO).len(), 1);
    }

    #[test]
    fn test_change_percent_uses_absolute_value() {
        let mut down = vec![alert(AlertKind::ChangePercent, dec!(5))];
        assert_eq!(evaluate(&mut down, dec!(100), dec!(-6)).len(), 1);

        let mut up = vec![alert(AlertKind::ChangePercent, dec!(5))];
        assert!(evaluate(&mut up, dec!(100), dec!(4.9)).is_empty());
        assert_eq!(evaluate(&mut up, dec!(100), dec!(5)).len(), 1);
    }

    #[test]
    fn test_multiple_alerts_evaluated_independently() {
        let mut alerts = vec![
            alert(AlertKind::Above, dec!(100)),
            alert(AlertKind::Below, dec!(80)),
            alert(AlertKind::Above, dec!(200)),
        ];
        let fired = evaluate(&mut alerts, dec!(150), Decimal::ZERO);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].threshold, dec!(100));
        assert!(!alerts[1].triggered);
        assert!(!alerts[2].triggered);
    }

    #[test]
    fn test_default_messages() {
        assert_eq!(
            default_message("TSLA", AlertKind::Above, dec!(300)),
            "TSLA rose above 300"
        );
        assert_eq!(
            default_message("TSLA", AlertKind::ChangePercent, dec!(5)),
            "TSLA moved more than 5%"
        );
    }
}

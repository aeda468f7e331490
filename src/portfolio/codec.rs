//! Conversion between positions and their plain persisted structure
//!
//! The persisted form is a plain nested JSON value: timestamps as RFC 3339
//! strings, decimal amounts as decimal strings (exact round trip), history
//! and alerts as arrays of flat records. File formats (pretty JSON on disk,
//! CSV exports) are the storage layer's concern; this module only maps
//! between `Position` and the structure.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::errors::FormatError;
use crate::portfolio::alerts::{Alert, AlertKind};
use crate::portfolio::position::{Position, PricePoint};

/// Emit every field of a position as a plain nested structure
pub fn to_structure(position: &Position) -> Value {
    json!({
        "symbol": position.symbol,
        "quantity": position.quantity.to_string(),
        "initial_price": position.initial_price.to_string(),
        "purchase_price": position.purchase_price.to_string(),
        "current_price": position.current_price.to_string(),
        "change": position.change.to_string(),
        "change_percent": position.change_percent.to_string(),
        "daily_high": position.daily_high.to_string(),
        "daily_low": position.daily_low.to_string(),
        "volume": position.volume,
        "market_cap": position.market_cap,
        "pe_ratio": position.pe_ratio.to_string(),
        "dividend_yield": position.dividend_yield.to_string(),
        "notes": position.notes,
        "last_updated": position.last_updated.to_rfc3339(),
        "purchase_date": position.purchase_date.to_rfc3339(),
        "price_history": position.price_history.iter().map(|point| json!({
            "timestamp": point.timestamp.to_rfc3339(),
            "price": point.price.to_string(),
            "change": point.change.to_string(),
            "change_percent": point.change_percent.to_string(),
        })).collect::<Vec<_>>(),
        "alerts": position.alerts.iter().map(|alert| json!({
            "kind": kind_to_str(alert.kind),
            "threshold": alert.threshold.to_string(),
            "message": alert.message,
            "created_at": alert.created_at.to_rfc3339(),
            "triggered": alert.triggered,
            "triggered_at": alert.triggered_at.map(|t| t.to_rfc3339()),
        })).collect::<Vec<_>>(),
    })
}

/// Reconstruct a position from its persisted structure.
///
/// Required: symbol, quantity, initial_price, current_price, change,
/// change_percent, last_updated, purchase_date. Everything else defaults:
/// purchase_price to the initial price, daily high/low to the current
/// price, numeric context fields to zero, notes/history/alerts to empty.
pub fn from_structure(value: &Value) -> Result<Position, FormatError> {
    let symbol = required_str(value, "symbol")?.to_string();
    let quantity = required_decimal(value, "quantity")?;
    let initial_price = required_decimal(value, "initial_price")?;
    let current_price = required_decimal(value, "current_price")?;
    let change = required_decimal(value, "change")?;
    let change_percent = required_decimal(value, "change_percent")?;
    let last_updated = required_timestamp(value, "last_updated")?;
    let purchase_date = required_timestamp(value, "purchase_date")?;

    let purchase_price = optional_decimal(value, "purchase_price")?.unwrap_or(initial_price);
    let daily_high = optional_decimal(value, "daily_high")?.unwrap_or(current_price);
    let daily_low = optional_decimal(value, "daily_low")?.unwrap_or(current_price);
    let pe_ratio = optional_decimal(value, "pe_ratio")?.unwrap_or(Decimal::ZERO);
    let dividend_yield = optional_decimal(value, "dividend_yield")?.unwrap_or(Decimal::ZERO);
    let volume = optional_u64(value, "volume")?.unwrap_or(0);
    let market_cap = optional_u64(value, "market_cap")?.unwrap_or(0);
    let notes = match value.get("notes") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let mut price_history = Vec::new();
    if let Some(entries) = value.get("price_history").and_then(|v| v.as_array()) {
        for entry in entries {
            price_history.push(history_point_from(entry)?);
        }
    }

    let mut alerts = Vec::new();
    if let Some(entries) = value.get("alerts").and_then(|v| v.as_array()) {
        for entry in entries {
            alerts.push(alert_from(entry)?);
        }
    }

    Ok(Position {
        symbol,
        quantity,
        initial_price,
        purchase_price,
        current_price,
        change,
        change_percent,
        daily_high,
        daily_low,
        volume,
        market_cap,
        pe_ratio,
        dividend_yield,
        price_history,
        alerts,
        notes,
        last_updated,
        purchase_date,
    })
}

fn history_point_from(value: &Value) -> Result<PricePoint, FormatError> {
    Ok(PricePoint {
        timestamp: required_timestamp(value, "timestamp")?,
        price: required_decimal(value, "price")?,
        change: optional_decimal(value, "change")?.unwrap_or(Decimal::ZERO),
        change_percent: optional_decimal(value, "change_percent")?.unwrap_or(Decimal::ZERO),
    })
}

fn alert_from(value: &Value) -> Result<Alert, FormatError> {
    let kind = match required_str(value, "kind")? {
        "above" => AlertKind::Above,
        "below" => AlertKind::Below,
        "change_percent" => AlertKind::ChangePercent,
        other => {
            return Err(FormatError::UnknownValue {
                field: "kind",
                value: other.to_string(),
            })
        }
    };
    let triggered_at = match value.get("triggered_at") {
        None | Some(Value::Null) => None,
        Some(_) => Some(required_timestamp(value, "triggered_at")?),
    };
    Ok(Alert {
        kind,
        threshold: required_decimal(value, "threshold")?,
        message: required_str(value, "message")?.to_string(),
        created_at: required_timestamp(value, "created_at")?,
        triggered: value
            .get("triggered")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        triggered_at,
    })
}

fn kind_to_str(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::Above => "above",
        AlertKind::Below => "below",
        AlertKind::ChangePercent => "change_percent",
    }
}

fn present<'a>(value: &'a Value, field: &'static str) -> Result<&'a Value, FormatError> {
    match value.get(field) {
        None | Some(Value::Null) => Err(FormatError::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn required_str<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, FormatError> {
    present(value, field)?
        .as_str()
        .ok_or(FormatError::MissingField(field))
}

fn required_timestamp(value: &Value, field: &'static str) -> Result<DateTime<Utc>, FormatError> {
    let raw = required_str(value, field)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| FormatError::InvalidTimestamp {
            field,
            value: raw.to_string(),
        })
}

/// Decimals are written as strings for exactness, but numeric JSON is
/// accepted too (hand-edited files, older exports).
fn decimal_from(raw: &Value, field: &'static str) -> Result<Decimal, FormatError> {
    let invalid = || FormatError::InvalidNumber {
        field,
        value: raw.to_string(),
    };
    match raw {
        Value::String(s) => s.parse::<Decimal>().map_err(|_| invalid()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Decimal::from(u))
            } else {
                n.as_f64()
                    .and_then(Decimal::from_f64)
                    .ok_or_else(invalid)
            }
        }
        _ => Err(invalid()),
    }
}

fn required_decimal(value: &Value, field: &'static str) -> Result<Decimal, FormatError> {
    decimal_from(present(value, field)?, field)
}

fn optional_decimal(value: &Value, field: &'static str) -> Result<Option<Decimal>, FormatError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => decimal_from(raw, field).map(Some),
    }
}

fn optional_u64(value: &Value, field: &'static str) -> Result<Option<u64>, FormatError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => raw
            .as_u64()
            .map(Some)
            .ok_or(FormatError::InvalidNumber {
                field,
                value: raw.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn sample_position() -> Position {
        let mut position = Position::new("AAPL", dec!(10), dec!(100), Some(dec!(95.5))).unwrap();
        position.update_price(dec!(110.25), Some(1_234_567), None, None);
        position.update_price(dec!(108.75), None, Some(dec!(111)), Some(dec!(99.5)));
        position.market_cap = 2_500_000_000_000;
        position.pe_ratio = dec!(27.3);
        position.dividend_yield = dec!(0.52);
        position.notes = "core holding".to_string();
        position.add_alert(AlertKind::Above, dec!(120), None);
        position.add_alert(AlertKind::Below, dec!(90), Some("bail out".to_string()));
        // Latch one alert so both triggered states round-trip
        position.alerts[0].triggered = true;
        position.alerts[0].triggered_at = Some(Utc::now());
        position
    }

    #[test]
    fn test_round_trip_reproduces_every_field() {
        let position = sample_position();
        let restored = from_structure(&to_structure(&position)).unwrap();
        assert_eq!(restored, position);
    }

    #[test]
    fn test_structure_uses_rfc3339_timestamps() {
        let position = sample_position();
        let value = to_structure(&position);
        let raw = value["last_updated"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(raw).is_ok());
        assert_eq!(
            value["price_history"].as_array().unwrap().len(),
            position.price_history.len()
        );
    }

    #[test]
    fn test_missing_required_field() {
        let mut value = to_structure(&sample_position());
        value.as_object_mut().unwrap().remove("quantity");
        assert!(matches!(
            from_structure(&value),
            Err(FormatError::MissingField("quantity"))
        ));
    }

    #[test]
    fn test_invalid_timestamp() {
        let mut value = to_structure(&sample_position());
        value["last_updated"] = json!("not-a-date");
        assert!(matches!(
            from_structure(&value),
            Err(FormatError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_optional_fields_default() {
        let value = json!({
            "symbol": "MSFT",
            "quantity": "5",
            "initial_price": "300",
            "current_price": "310",
            "change": "10",
            "change_percent": "3.33",
            "last_updated": "2026-08-01T14:30:00Z",
            "purchase_date": "2026-07-01T09:00:00Z",
        });
        let position = from_structure(&value).unwrap();

        assert_eq!(position.purchase_price, dec!(300));
        assert_eq!(position.daily_high, dec!(310));
        assert_eq!(position.daily_low, dec!(310));
        assert_eq!(position.volume, 0);
        assert_eq!(position.market_cap, 0);
        assert_eq!(position.pe_ratio, Decimal::ZERO);
        assert_eq!(position.dividend_yield, Decimal::ZERO);
        assert_eq!(position.notes, "");
        assert!(position.price_history.is_empty());
        assert!(position.alerts.is_empty());
    }

    #[test]
    fn test_numeric_json_accepted_for_decimals() {
        let value = json!({
            "symbol": "MSFT",
            "quantity": 5,
            "initial_price": 300.5,
            "current_price": 310,
            "change": 9.5,
            "change_percent": 3,
            "last_updated": "2026-08-01T14:30:00Z",
            "purchase_date": "2026-07-01T09:00:00Z",
        });
        let position = from_structure(&value).unwrap();
        assert_eq!(position.quantity, dec!(5));
        assert_eq!(position.initial_price, dec!(300.5));
    }

    #[test]
    fn test_unknown_alert_kind_rejected() {
        let mut value = to_structure(&sample_position());
        value["alerts"][0]["kind"] = json!("sideways");
        assert!(matches!(
            from_structure(&value),
            Err(FormatError::UnknownValue { field: "kind", .. })
        ));
    }

    #[test]
    fn test_timestamps_preserve_instant() {
        let position = sample_position();
        let restored = from_structure(&to_structure(&position)).unwrap();
        assert_eq!(restored.last_updated, position.last_updated);
        assert_eq!(
            restored.alerts[0].triggered_at,
            position.alerts[0].triggered_at
        );
    }
}

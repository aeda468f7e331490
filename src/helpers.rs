//! Formatting and validation helpers shared by the CLI and display layers

use rust_decimal::Decimal;

use crate::errors::ValidationError;

/// Format an amount as currency, e.g. `$1,234.56`
pub fn format_currency(amount: Decimal) -> String {
    let negative = amount < Decimal::ZERO;
    let rounded = amount.abs().round_dp(2);
    let text = format!("{:.2}", rounded);
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    // Insert thousands separators into the integer part
    let mut grouped = String::new();
    let digits: Vec<char> = whole.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    if negative {
        format!("-${}.{}", grouped, frac)
    } else {
        format!("${}.{}", grouped, frac)
    }
}

/// Format a percentage with an explicit sign, e.g. `+2.41%`
pub fn format_percentage(percent: Decimal) -> String {
    if percent >= Decimal::ZERO {
        format!("+{:.2}%", percent)
    } else {
        format!("{:.2}%", percent)
    }
}

/// Validate a stock symbol: alphabetic, 1-5 characters
pub fn validate_symbol(symbol: &str) -> Result<(), ValidationError> {
    let valid = !symbol.is_empty()
        && symbol.len() <= 5
        && symbol.chars().all(|c| c.is_ascii_alphabetic());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidSymbol(symbol.to_string()))
    }
}

/// Parse a decimal CLI argument, rejecting negative values
pub fn parse_positive_decimal(s: &str) -> Result<Decimal, String> {
    let value: Decimal = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value < Decimal::ZERO {
        return Err(format!("Value must be non-negative, got {}", value));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(-987654.321)), "-$987,654.32");
        assert_eq!(format_currency(dec!(999)), "$999.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(dec!(2.405)), "+2.41%");
        assert_eq!(format_percentage(dec!(-3.1)), "-3.10%");
        assert_eq!(format_percentage(dec!(0)), "+0.00%");
    }

    #[test]
    fn test_validate_symbol() {
        assert!(validate_symbol("AAPL").is_ok());
        assert!(validate_symbol("a").is_ok());
        assert!(validate_symbol("GOOGL").is_ok());
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("TOOLONG").is_err());
        assert!(validate_symbol("BRK.B").is_err());
        assert!(validate_symbol("A1").is_err());
    }

    #[test]
    fn test_parse_positive_decimal() {
        assert_eq!(parse_positive_decimal("10.5"), Ok(dec!(10.5)));
        assert!(parse_positive_decimal("-1").is_err());
        assert!(parse_positive_decimal("NaN").is_err());
        assert!(parse_positive_decimal("abc").is_err());
    }
}

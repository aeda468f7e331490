//! Domain error types shared across the portfolio engine

use thiserror::Error;

/// Errors raised when constructing or mutating portfolio state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Quantity cannot be negative: {0}")]
    NegativeQuantity(rust_decimal::Decimal),
    #[error("Price must be a finite, non-negative number: {0}")]
    InvalidPrice(String),
    #[error("Invalid stock symbol '{0}': must be 1-5 alphabetic characters")]
    InvalidSymbol(String),
    #[error("Split ratio must be positive: {0}")]
    InvalidSplitRatio(rust_decimal::Decimal),
}

/// Errors raised when decoding a persisted position structure
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Field '{field}' is not a valid timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("Field '{field}' is not a valid number: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Field '{field}' has unknown value: {value}")]
    UnknownValue { field: &'static str, value: String },
}

//! Portfolio aggregate: an ordered set of positions, unique by symbol

use rust_decimal::Decimal;
use tracing::info;

use crate::errors::ValidationError;
use crate::helpers::validate_symbol;
use crate::portfolio::position::Position;

/// Ordered collection of positions, unique by symbol (case-insensitive).
/// Positions are owned exclusively; all access goes through lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    positions: Vec<Position>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a portfolio from already-validated positions (persistence path)
    pub fn from_positions(positions: Vec<Position>) -> Self {
        Self { positions }
    }

    /// Add shares of a symbol.
    ///
    /// An existing position absorbs the shares through the canonical
    /// weighted-average buy path; otherwise a new position is created with
    /// `initial_price = purchase_price = price`. The symbol format rule
    /// (alphabetic, 1-5 characters) is enforced before any position is
    /// constructed.
    pub fn add_stock(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<(), ValidationError> {
        validate_symbol(symbol)?;
        if quantity < Decimal::ZERO {
            return Err(ValidationError::NegativeQuantity(quantity));
        }
        if price < Decimal::ZERO {
            return Err(ValidationError::InvalidPrice(price.to_string()));
        }

        if let Some(position) = self.get_stock_mut(symbol) {
            position.add_quantity(quantity, Some(price));
            info!(symbol = %position.symbol, quantity = %quantity, "Merged shares into existing position");
            return Ok(());
        }

        let position = Position::new(symbol, quantity, price, None)?;
        info!(symbol = %position.symbol, quantity = %quantity, price = %price, "Opened new position");
        self.positions.push(position);
        Ok(())
    }

    /// Remove a holding entirely (full liquidation). Returns false when the
    /// symbol is not held.
    pub fn remove_stock(&mut self, symbol: &str) -> bool {
        let before = self.positions.len();
        self.positions
            .retain(|p| !p.symbol.eq_ignore_ascii_case(symbol));
        let removed = self.positions.len() < before;
        if removed {
            info!(symbol = %symbol.to_uppercase(), "Removed position");
        }
        removed
    }

    /// Case-insensitive lookup
    pub fn get_stock(&self, symbol: &str) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn get_stock_mut(&mut self, symbol: &str) -> Option<&mut Position> {
        self.positions
            .iter_mut()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Sum of every position's market value; zero when empty
    pub fn total_value(&self) -> Decimal {
        self.positions.iter().map(|p| p.current_value()).sum()
    }

    /// Sum of every position's unrealized gain/loss; zero when empty
    pub fn total_gain_loss(&self) -> Decimal {
        self.positions.iter().map(|p| p.total_gain_loss()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    pub fn positions_mut(&mut self) -> impl Iterator<Item = &mut Position> {
        self.positions.iter_mut()
    }

    /// Held symbols, in insertion order
    pub fn symbols(&self) -> Vec<String> {
        self.positions.iter().map(|p| p.symbol.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_add_and_lookup_case_insensitive() {
        let mut portfolio = Portfolio::new();
        portfolio.add_stock("aapl", dec!(10), dec!(150)).unwrap();

        assert_eq!(portfolio.len(), 1);
        let position = portfolio.get_stock("AAPL").unwrap();
        assert_eq!(position.symbol, "AAPL");
        assert!(portfolio.get_stock("Aapl").is_some());
        assert!(portfolio.get_stock("MSFT").is_none());
    }

    #[test]
    fn test_add_existing_uses_weighted_average() {
        let mut portfolio = Portfolio::new();
        portfolio.add_stock("AAPL", dec!(10), dec!(100)).unwrap();
        portfolio.add_stock("aapl", dec!(10), dec!(200)).unwrap();

        // One position, blended basis; no duplicate for the lowercase spelling
        assert_eq!(portfolio.len(), 1);
        let position = portfolio.get_stock("AAPL").unwrap();
        assert_eq!(position.quantity, dec!(20));
        assert_eq!(position.purchase_price, dec!(150));
        // Initial price stays at the first buy
        assert_eq!(position.initial_price, dec!(100));
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut portfolio = Portfolio::new();
        assert!(matches!(
            portfolio.add_stock("TOOLONG", dec!(1), dec!(1)),
            Err(ValidationError::InvalidSymbol(_))
        ));
        assert!(matches!(
            portfolio.add_stock("AAPL", dec!(-1), dec!(1)),
            Err(ValidationError::NegativeQuantity(_))
        ));
        assert!(matches!(
            portfolio.add_stock("AAPL", dec!(1), dec!(-1)),
            Err(ValidationError::InvalidPrice(_))
        ));
        assert!(portfolio.is_empty());
    }

    #[test]
    fn test_remove_stock() {
        let mut portfolio = Portfolio::new();
        portfolio.add_stock("AAPL", dec!(10), dec!(150)).unwrap();

        assert!(portfolio.remove_stock("aapl"));
        assert!(!portfolio.remove_stock("AAPL"));
        assert!(portfolio.is_empty());
    }

    #[test]
    fn test_aggregate_consistency() {
        let mut portfolio = Portfolio::new();
        portfolio.add_stock("AAPL", dec!(10), dec!(100)).unwrap();
        portfolio.add_stock("MSFT", dec!(5), dec!(200)).unwrap();
        portfolio
            .get_stock_mut("AAPL")
            .unwrap()
            .update_price(dec!(120), None, None, None);

        let expected: Decimal = portfolio.positions().map(|p| p.current_value()).sum();
        assert_eq!(portfolio.total_value(), expected);
        assert_eq!(portfolio.total_value(), dec!(2200));
        assert_eq!(portfolio.total_gain_loss(), dec!(200));

        for symbol in portfolio.symbols() {
            portfolio.remove_stock(&symbol);
        }
        assert_eq!(portfolio.total_value(), Decimal::ZERO);
        assert_eq!(portfolio.total_gain_loss(), Decimal::ZERO);
        assert!(portfolio.is_empty());
    }

    #[test]
    fn test_empty_portfolio_totals() {
        let portfolio = Portfolio::new();
        assert_eq!(portfolio.total_value(), Decimal::ZERO);
        assert_eq!(portfolio.total_gain_loss(), Decimal::ZERO);
        assert_eq!(portfolio.len(), 0);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut portfolio = Portfolio::new();
        for symbol in ["GME", "AAPL", "MSFT"] {
            portfolio.add_stock(symbol, dec!(1), dec!(10)).unwrap();
        }
        assert_eq!(portfolio.symbols(), vec!["GME", "AAPL", "MSFT"]);
    }
}

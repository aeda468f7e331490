//! Position entity: quantity/cost state, price history and derived metrics
//!
//! A `Position` owns everything the engine knows about one holding: the
//! blended cost basis, the latest market state, a bounded price history and
//! the alerts attached to it. All mutation goes through its methods; the
//! aggregate (`Portfolio`) never reaches into the fields directly.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::errors::ValidationError;
use crate::portfolio::alerts::{self, Alert, AlertKind};

/// Price history is capped so a long-running refresh loop cannot grow a
/// position without bound. Oldest entries are evicted first.
pub const MAX_PRICE_HISTORY: usize = 100;

/// One observed price, recorded on every update
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    /// Delta versus the previous observation (not versus the initial price)
    pub change: Decimal,
    pub change_percent: Decimal,
}

/// One market observation delivered by the market-data collaborator.
///
/// Only `price` is mandatory; every other field updates the position when
/// present. Collaborator-supplied `change`/`change_percent` override the
/// engine's own computation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTick {
    pub price: Decimal,
    pub change: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub volume: Option<u64>,
    pub daily_high: Option<Decimal>,
    pub daily_low: Option<Decimal>,
    pub market_cap: Option<u64>,
    pub pe_ratio: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
}

impl PriceTick {
    pub fn price_only(price: Decimal) -> Self {
        Self {
            price,
            ..Self::default()
        }
    }
}

/// Intraday high/low summary
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRange {
    pub high: Decimal,
    pub low: Decimal,
    pub range: Decimal,
    pub range_percent: Decimal,
}

/// Everything the presentation layer needs about one position, in one read
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub symbol: String,
    pub quantity: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub initial_value: Decimal,
    pub purchase_value: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_percent: Decimal,
    pub day_gain_loss: Decimal,
    pub day_gain_loss_percent: Decimal,
    pub price_range: PriceRange,
    pub volume: u64,
    pub market_cap: u64,
    pub pe_ratio: Decimal,
    pub dividend_yield: Decimal,
}

/// Single holding: symbol, quantity, cost basis and market state
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Canonical uppercase identifier; uniqueness key within a portfolio
    pub symbol: String,
    /// Shares held, never negative
    pub quantity: Decimal,
    /// Reference price captured at first construction
    pub initial_price: Decimal,
    /// Quantity-weighted average cost basis across all buys
    pub purchase_price: Decimal,
    pub current_price: Decimal,
    /// Delta versus `initial_price`, maintained by `update_price`
    pub change: Decimal,
    pub change_percent: Decimal,
    pub daily_high: Decimal,
    pub daily_low: Decimal,
    pub volume: u64,
    pub market_cap: u64,
    pub pe_ratio: Decimal,
    pub dividend_yield: Decimal,
    /// Most recent observations, oldest first, capped at `MAX_PRICE_HISTORY`
    pub price_history: Vec<PricePoint>,
    pub alerts: Vec<Alert>,
    /// Free-form annotation, no semantic effect
    pub notes: String,
    pub last_updated: DateTime<Utc>,
    pub purchase_date: DateTime<Utc>,
}

impl Position {
    /// Create a new position.
    ///
    /// `purchase_price` defaults to `initial_price`. The history is seeded
    /// with one zero-delta entry at the initial price.
    pub fn new(
        symbol: &str,
        quantity: Decimal,
        initial_price: Decimal,
        purchase_price: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        if quantity < Decimal::ZERO {
            return Err(ValidationError::NegativeQuantity(quantity));
        }
        if initial_price < Decimal::ZERO {
            return Err(ValidationError::InvalidPrice(initial_price.to_string()));
        }
        let purchase_price = purchase_price.unwrap_or(initial_price);
        if purchase_price < Decimal::ZERO {
            return Err(ValidationError::InvalidPrice(purchase_price.to_string()));
        }

        let now = Utc::now();
        Ok(Self {
            symbol: symbol.to_uppercase(),
            quantity,
            initial_price,
            purchase_price,
            current_price: initial_price,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            daily_high: initial_price,
            daily_low: initial_price,
            volume: 0,
            market_cap: 0,
            pe_ratio: Decimal::ZERO,
            dividend_yield: Decimal::ZERO,
            price_history: vec![PricePoint {
                timestamp: now,
                price: initial_price,
                change: Decimal::ZERO,
                change_percent: Decimal::ZERO,
            }],
            alerts: Vec::new(),
            notes: String::new(),
            last_updated: now,
            purchase_date: now,
        })
    }

    /// Apply one observed price.
    ///
    /// `change`/`change_percent` are recomputed against the initial price;
    /// the appended history entry records the delta against the *previous*
    /// current price. Explicit `daily_high`/`daily_low` overwrite the
    /// running values, otherwise the running max/min is extended with the
    /// new price.
    pub fn update_price(
        &mut self,
        new_price: Decimal,
        volume: Option<u64>,
        daily_high: Option<Decimal>,
        daily_low: Option<Decimal>,
    ) {
        let old_price = self.current_price;
        self.current_price = new_price;
        self.change = new_price - self.initial_price;
        self.change_percent = if self.initial_price > Decimal::ZERO {
            self.change / self.initial_price * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        if let Some(volume) = volume {
            self.volume = volume;
        }
        match daily_high {
            Some(high) => self.daily_high = high,
            None => self.daily_high = self.daily_high.max(new_price),
        }
        match daily_low {
            Some(low) => self.daily_low = low,
            None => self.daily_low = self.daily_low.min(new_price),
        }
        // Uphold high >= low even when the feed delivers them inverted
        if self.daily_high < self.daily_low {
            std::mem::swap(&mut self.daily_high, &mut self.daily_low);
        }

        let tick_change = new_price - old_price;
        let tick_change_percent = if old_price > Decimal::ZERO {
            tick_change / old_price * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        let now = Utc::now();
        self.price_history.push(PricePoint {
            timestamp: now,
            price: new_price,
            change: tick_change,
            change_percent: tick_change_percent,
        });
        if self.price_history.len() > MAX_PRICE_HISTORY {
            let excess = self.price_history.len() - MAX_PRICE_HISTORY;
            self.price_history.drain(0..excess);
        }

        self.last_updated = now;
    }

    /// Apply a full market tick from the data collaborator.
    ///
    /// Collaborator-supplied deltas win over the engine's own computation.
    pub fn apply_tick(&mut self, tick: &PriceTick) {
        self.update_price(tick.price, tick.volume, tick.daily_high, tick.daily_low);

        if let Some(change) = tick.change {
            self.change = change;
        }
        if let Some(change_percent) = tick.change_percent {
            self.change_percent = change_percent;
        }
        if let Some(market_cap) = tick.market_cap {
            self.market_cap = market_cap;
        }
        if let Some(pe_ratio) = tick.pe_ratio {
            self.pe_ratio = pe_ratio;
        }
        if let Some(dividend_yield) = tick.dividend_yield {
            self.dividend_yield = dividend_yield;
        }
    }

    /// Buy more shares, blending the cost basis.
    ///
    /// `price` defaults to the current market price. The weighted average
    /// is only recomputed when the resulting total is positive; a zero
    /// total leaves the basis untouched. This is the single canonical
    /// "add to position" operation; the portfolio-level entry point
    /// delegates here.
    pub fn add_quantity(&mut self, quantity: Decimal, price: Option<Decimal>) {
        let price = price.unwrap_or(self.current_price);
        let total = self.quantity + quantity;
        if total > Decimal::ZERO {
            self.purchase_price =
                (self.quantity * self.purchase_price + quantity * price) / total;
        }
        // Held quantity never goes negative
        self.quantity = total.max(Decimal::ZERO);
    }

    /// Sell shares, clamping at zero
    pub fn remove_quantity(&mut self, quantity: Decimal) {
        if quantity >= self.quantity {
            self.quantity = Decimal::ZERO;
        } else {
            self.quantity -= quantity;
        }
    }

    /// Apply a stock split: multiply the share count, divide every current
    /// and historical price by the ratio so pre- and post-split values stay
    /// comparable. `change`/`change_percent` are left stale until the next
    /// price update.
    pub fn split(&mut self, ratio: Decimal) -> Result<(), ValidationError> {
        if ratio <= Decimal::ZERO {
            return Err(ValidationError::InvalidSplitRatio(ratio));
        }
        self.quantity *= ratio;
        self.purchase_price /= ratio;
        self.current_price /= ratio;
        self.initial_price /= ratio;
        self.daily_high /= ratio;
        self.daily_low /= ratio;
        for point in &mut self.price_history {
            point.price /= ratio;
        }
        Ok(())
    }

    /// Market value of the holding at the current price
    pub fn current_value(&self) -> Decimal {
        self.quantity * self.current_price
    }

    /// Value at the initial reference price
    pub fn initial_value(&self) -> Decimal {
        self.quantity * self.initial_price
    }

    /// Value at the blended cost basis
    pub fn purchase_value(&self) -> Decimal {
        self.quantity * self.purchase_price
    }

    /// Unrealized gain/loss versus the cost basis
    pub fn total_gain_loss(&self) -> Decimal {
        (self.current_price - self.purchase_price) * self.quantity
    }

    pub fn total_gain_loss_percent(&self) -> Decimal {
        if self.purchase_price > Decimal::ZERO {
            (self.current_price - self.purchase_price) / self.purchase_price
                * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    /// Gain/loss since a caller-supplied anchor timestamp.
    ///
    /// The reference is the earliest history entry at or after the anchor;
    /// returns `(0, 0)` when no entry qualifies or the reference price is
    /// non-positive. Calendar-day anchoring (session open, midnight) is the
    /// scheduling collaborator's choice, not the engine's.
    pub fn gain_loss_since(&self, anchor: DateTime<Utc>) -> (Decimal, Decimal) {
        let reference = match self.price_history.iter().find(|p| p.timestamp >= anchor) {
            Some(point) => point,
            None => return (Decimal::ZERO, Decimal::ZERO),
        };
        if reference.price <= Decimal::ZERO {
            return (Decimal::ZERO, Decimal::ZERO);
        }
        let delta = self.current_price - reference.price;
        let gain = delta * self.quantity;
        let percent = delta / reference.price * Decimal::ONE_HUNDRED;
        (gain, percent)
    }

    /// Intraday range derived from the running high/low
    pub fn price_range(&self) -> PriceRange {
        let range = self.daily_high - self.daily_low;
        let range_percent = if self.daily_low > Decimal::ZERO {
            range / self.daily_low * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        PriceRange {
            high: self.daily_high,
            low: self.daily_low,
            range,
            range_percent,
        }
    }

    /// Bundle every derived metric for the presentation collaborator.
    /// `anchor` selects the reference entry for the day gain/loss figures.
    pub fn performance_metrics(&self, anchor: DateTime<Utc>) -> PerformanceMetrics {
        let (day_gain_loss, day_gain_loss_percent) = self.gain_loss_since(anchor);
        PerformanceMetrics {
            symbol: self.symbol.clone(),
            quantity: self.quantity,
            current_price: self.current_price,
            current_value: self.current_value(),
            initial_value: self.initial_value(),
            purchase_value: self.purchase_value(),
            total_gain_loss: self.total_gain_loss(),
            total_gain_loss_percent: self.total_gain_loss_percent(),
            day_gain_loss,
            day_gain_loss_percent,
            price_range: self.price_range(),
            volume: self.volume,
            market_cap: self.market_cap,
            pe_ratio: self.pe_ratio,
            dividend_yield: self.dividend_yield,
        }
    }

    /// History entries from the last `days` days; does not mutate the history
    pub fn recent_history(&self, days: i64) -> Vec<PricePoint> {
        let cutoff = Utc::now() - Duration::days(days);
        self.price_history
            .iter()
            .filter(|p| p.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// Start a fresh trading session: high/low collapse onto the current
    /// price and volume resets. Invoked by the scheduling collaborator.
    pub fn reset_daily_metrics(&mut self) {
        self.daily_high = self.current_price;
        self.daily_low = self.current_price;
        self.volume = 0;
    }

    /// Attach an untriggered alert. A missing message gets a generated one.
    pub fn add_alert(&mut self, kind: AlertKind, threshold: Decimal, message: Option<String>) {
        let message =
            message.unwrap_or_else(|| alerts::default_message(&self.symbol, kind, threshold));
        self.alerts.push(Alert {
            kind,
            threshold,
            message,
            created_at: Utc::now(),
            triggered: false,
            triggered_at: None,
        });
    }

    /// Evaluate all armed alerts against the current price state and return
    /// the ones that fired. Fired alerts latch and never re-evaluate.
    pub fn check_alerts(&mut self) -> Vec<Alert> {
        alerts::evaluate(&mut self.alerts, self.current_price, self.change_percent)
    }
}

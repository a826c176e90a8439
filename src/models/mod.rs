use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One OHLC observation for a fixed time interval (bid prices)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Bid/ask open of the most recent candle, used for spread and entry prices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid_open: f64,
    pub ask_open: f64,
}

impl Quote {
    pub fn spread(&self) -> f64 {
        self.ask_open - self.bid_open
    }
}

/// Directional signal emitted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    None,
    Buy,
    Sell,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::None => "None",
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
        }
    }
}

/// Trade direction evaluated by the decision gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "Buy",
            Direction::Sell => "Sell",
        }
    }

    /// The signal that matches this direction
    pub fn matching_signal(&self) -> Signal {
        match self {
            Direction::Buy => Signal::Buy,
            Direction::Sell => Signal::Sell,
        }
    }
}

/// Entry, stop-loss and take-profit prices for one direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevels {
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Buy and sell levels computed from the same ATR/quote snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelPair {
    pub buy: RiskLevels,
    pub sell: RiskLevels,
}

impl LevelPair {
    pub fn for_direction(&self, direction: Direction) -> RiskLevels {
        match direction {
            Direction::Buy => self.buy,
            Direction::Sell => self.sell,
        }
    }
}

/// Outcome of one gate evaluation for one direction
#[derive(Debug, Clone, PartialEq)]
pub struct TradeDecision {
    pub signal: Signal,
    pub direction: Direction,
    pub units: i64,
    pub risk_levels: RiskLevels,
    pub accepted: bool,
    pub rejection_reason: Option<String>,
    pub snapshot_price: f64,
}

/// Durable record of a submitted order
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub signal: Signal,
    pub direction: Direction,
    pub success: bool,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
}

/// Durable record of a rejected or failed attempt
///
/// Aborted runs (market data or exposure query failures) have no
/// direction and no entry price.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedTradeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub signal: Signal,
    pub direction: Option<Direction>,
    pub reason: String,
    pub entry_price: Option<f64>,
}

impl TradeRecord {
    pub fn new(
        signal: Signal,
        direction: Direction,
        success: bool,
        entry_price: f64,
        exit_price: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            signal,
            direction,
            success,
            entry_price,
            exit_price,
        }
    }
}

impl FailedTradeRecord {
    pub fn new(
        signal: Signal,
        direction: Option<Direction>,
        reason: impl Into<String>,
        entry_price: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            signal,
            direction,
            reason: reason.into(),
            entry_price,
        }
    }
}

// Risk level calculator: ATR and spread into stop-loss/take-profit
// distances per direction.

use crate::models::{LevelPair, RiskLevels};

/// Compute stop-loss/take-profit/entry levels for both directions
///
/// `slatr = atr_multiplier * atr` is the stop distance; the take-profit
/// distance is `slatr * reward_risk_ratio`. The spread is added on the
/// adverse side of each level so the levels hold after crossing it.
///
/// Sell enters at the bid, Buy at the ask.
pub fn compute_levels(
    atr: f64,
    bid_open: f64,
    ask_open: f64,
    reward_risk_ratio: f64,
    atr_multiplier: f64,
) -> LevelPair {
    let spread = ask_open - bid_open;
    let slatr = atr_multiplier * atr;

    let sell = RiskLevels {
        entry_price: bid_open,
        stop_loss: ask_open + slatr + spread,
        take_profit: bid_open - slatr * reward_risk_ratio - spread,
    };

    let buy = RiskLevels {
        entry_price: ask_open,
        stop_loss: bid_open - slatr - spread,
        take_profit: ask_open + slatr * reward_risk_ratio + spread,
    };

    LevelPair { buy, sell }
}

// Decision gate: turns a signal plus risk levels into accepted or
// rejected trade decisions under exposure and spread constraints.

use crate::models::{Direction, LevelPair, Signal, TradeDecision};
use serde::{Deserialize, Serialize};

/// Which directions get a decision record per run
///
/// The reference evaluated both directions every run, emitting a
/// rejection for whichever one the signal did not match. `MatchingOnly`
/// trims the audit log to the signaled direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitMode {
    Both,
    MatchingOnly,
}

/// Gate constraints, read once per run
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub max_spread: f64,
    pub units: i64,
    pub emit_mode: EmitMode,
}

/// Evaluate one direction against the gate
///
/// Acceptance requires a matching signal, zero open positions and a
/// spread below the maximum, checked in that order; the rejection reason
/// names the first failing condition.
pub fn evaluate(
    signal: Signal,
    direction: Direction,
    levels: &LevelPair,
    open_positions: usize,
    spread: f64,
    config: &GateConfig,
) -> TradeDecision {
    let risk_levels = levels.for_direction(direction);
    let units = match direction {
        Direction::Buy => config.units,
        Direction::Sell => -config.units,
    };

    let rejection_reason = if signal != direction.matching_signal() {
        Some(format!(
            "No {} signal (signal was {})",
            direction.as_str(),
            signal.as_str()
        ))
    } else if open_positions > 0 {
        Some(format!("Existing exposure: {} open position(s)", open_positions))
    } else if spread >= config.max_spread {
        Some(format!(
            "Spread {:.6} at or above maximum {:.6}",
            spread, config.max_spread
        ))
    } else {
        None
    };

    TradeDecision {
        signal,
        direction,
        units,
        risk_levels,
        accepted: rejection_reason.is_none(),
        rejection_reason,
        snapshot_price: risk_levels.entry_price,
    }
}

/// Evaluate the gate for one pipeline run
///
/// Returns one decision per evaluated direction: both directions under
/// `EmitMode::Both` (Sell first, as in the reference), only the signaled
/// one under `MatchingOnly` (none when the signal is None).
pub fn decide(
    signal: Signal,
    levels: &LevelPair,
    open_positions: usize,
    spread: f64,
    config: &GateConfig,
) -> Vec<TradeDecision> {
    let directions: &[Direction] = match config.emit_mode {
        EmitMode::Both => &[Direction::Sell, Direction::Buy],
        EmitMode::MatchingOnly => match signal {
            Signal::Buy => &[Direction::Buy],
            Signal::Sell => &[Direction::Sell],
            Signal::None => &[],
        },
    };

    directions
        .iter()
        .map(|&direction| evaluate(signal, direction, levels, open_positions, spread, config))
        .collect()
}

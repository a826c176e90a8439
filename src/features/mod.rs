// Feature pipeline: candles in, aligned indicator columns out.

use crate::indicators::{
    atr_series, bollinger_series, ema_series, macd_series, rsi_series, stochastic_series,
};
use crate::models::Candle;

/// Indicator periods for the feature frame
///
/// Defaults match the reference strategy. Only the EMA periods are
/// expected to be tuned; the rest are part of the strategy definition.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub atr_period: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            atr_period: 7,
            ema_fast_period: 30,
            ema_slow_period: 50,
            rsi_period: 10,
            bb_period: 15,
            bb_std_dev: 1.5,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stoch_k_period: 14,
            stoch_d_period: 3,
        }
    }
}

impl FeatureConfig {
    /// Candles needed before every column has at least one defined value
    pub fn min_candles(&self) -> usize {
        [
            self.atr_period + 1,
            self.ema_fast_period,
            self.ema_slow_period,
            self.rsi_period + 1,
            self.bb_period,
            self.macd_slow + self.macd_signal - 1,
            self.stoch_k_period + self.stoch_d_period - 1,
        ]
        .into_iter()
        .fold(0, usize::max)
    }
}

/// Candle series plus derived indicator columns, aligned 1:1 by index
///
/// Positions before an indicator's minimum window are None. Every column
/// has the same length as `candles`.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    pub candles: Vec<Candle>,
    pub atr: Vec<Option<f64>>,
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub bb_mid: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_hist: Vec<Option<f64>>,
    pub stoch_k: Vec<Option<f64>>,
    pub stoch_d: Vec<Option<f64>>,
}

impl FeatureFrame {
    /// Compute all indicator columns over the candle series
    ///
    /// Each column only looks back: the value at index i depends on
    /// candles up to and including i.
    pub fn compute(candles: Vec<Candle>, config: &FeatureConfig) -> anyhow::Result<Self> {
        if candles.is_empty() {
            anyhow::bail!("Feature frame needs at least one candle");
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let atr = atr_series(&candles, config.atr_period);
        let ema_fast = ema_series(&closes, config.ema_fast_period);
        let ema_slow = ema_series(&closes, config.ema_slow_period);
        let rsi = rsi_series(&closes, config.rsi_period);
        let bands = bollinger_series(&closes, config.bb_period, config.bb_std_dev);
        let macd = macd_series(&closes, config.macd_fast, config.macd_slow, config.macd_signal);
        let stoch = stochastic_series(&candles, config.stoch_k_period, config.stoch_d_period);

        Ok(Self {
            candles,
            atr,
            ema_fast,
            ema_slow,
            rsi,
            bb_lower: bands.lower,
            bb_mid: bands.mid,
            bb_upper: bands.upper,
            macd: macd.line,
            macd_signal: macd.signal,
            macd_hist: macd.histogram,
            stoch_k: stoch.k,
            stoch_d: stoch.d,
        })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn close(&self, index: usize) -> f64 {
        self.candles[index].close
    }

    /// ATR at the most recent candle, if available
    pub fn latest_atr(&self) -> Option<f64> {
        self.atr.last().copied().flatten()
    }
}

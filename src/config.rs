use crate::gate::EmitMode;
use crate::strategy::SignalPolicy;
use crate::Result;
use serde::Deserialize;

/// Runtime configuration, read once per process
///
/// Defaults match the reference strategy; every field can be overridden
/// through `FXBOT_*` environment variables (e.g. `FXBOT_MAX_SPREAD`).
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub instrument: String,
    pub trade_units: i64,
    pub max_spread: f64,
    pub atr_multiplier: f64,
    pub reward_risk_ratio: f64,
    pub backcandles: usize,
    pub candle_count: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub signal_policy: SignalPolicy,
    pub emit_mode: EmitMode,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        let config = config::Config::builder()
            .set_default("instrument", "EUR_USD")?
            .set_default("trade_units", 3000)?
            .set_default("max_spread", 16e-5)?
            .set_default("atr_multiplier", 1.1)?
            .set_default("reward_risk_ratio", 1.5)?
            .set_default("backcandles", 7)?
            .set_default("candle_count", 70)?
            .set_default("ema_fast_period", 30)?
            .set_default("ema_slow_period", 50)?
            .set_default("signal_policy", "permissive")?
            .set_default("emit_mode", "both")?
            .add_source(config::Environment::with_prefix("FXBOT"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            instrument: "EUR_USD".to_string(),
            trade_units: 3000,
            max_spread: 16e-5,
            atr_multiplier: 1.1,
            reward_risk_ratio: 1.5,
            backcandles: 7,
            candle_count: 70,
            ema_fast_period: 30,
            ema_slow_period: 50,
            signal_policy: SignalPolicy::Permissive,
            emit_mode: EmitMode::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_strategy() {
        let config = BotConfig::default();

        assert_eq!(config.instrument, "EUR_USD");
        assert_eq!(config.trade_units, 3000);
        assert!((config.max_spread - 0.00016).abs() < 1e-12);
        assert!((config.atr_multiplier - 1.1).abs() < 1e-12);
        assert!((config.reward_risk_ratio - 1.5).abs() < 1e-12);
        assert_eq!(config.backcandles, 7);
        assert_eq!(config.candle_count, 70);
        assert_eq!(config.signal_policy, SignalPolicy::Permissive);
        assert_eq!(config.emit_mode, EmitMode::Both);
    }

    #[test]
    fn test_from_env_uses_defaults() {
        let config = BotConfig::from_env().unwrap();
        assert_eq!(config.ema_fast_period, 30);
        assert_eq!(config.ema_slow_period, 50);
    }
}

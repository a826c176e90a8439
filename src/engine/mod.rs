// Pipeline orchestration: one run_once() invocation wires the external
// collaborators through features -> signal -> levels -> gate -> audit.

use crate::config::BotConfig;
use crate::features::{FeatureConfig, FeatureFrame};
use crate::gate::{self, GateConfig};
use crate::models::{
    Candle, Direction, FailedTradeRecord, Quote, Signal, TradeDecision, TradeRecord,
};
use crate::risk::compute_levels;
use crate::strategy;
use crate::Result;
use thiserror::Error;
use tokio::sync::Mutex;

/// Market data collaborator: ordered candles (most recent last) and the
/// current bid/ask snapshot
#[allow(async_fn_in_trait)]
pub trait MarketData {
    async fn fetch_candles(&self, instrument: &str, count: usize) -> Result<Vec<Candle>>;
    async fn latest_quote(&self, instrument: &str) -> Result<Quote>;
}

/// Broker reference returned for a filled order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRef {
    pub id: String,
}

/// Exposure/order collaborator
#[allow(async_fn_in_trait)]
pub trait Broker {
    async fn count_open_positions(&self, instrument: &str) -> Result<usize>;
    async fn submit_market_order(
        &self,
        instrument: &str,
        units: i64,
        take_profit: f64,
        stop_loss: f64,
    ) -> Result<OrderRef>;
}

/// Append-only audit log collaborator
#[allow(async_fn_in_trait)]
pub trait AuditLog {
    async fn record_trade(&self, record: &TradeRecord) -> Result<()>;
    async fn record_failed_trade(&self, record: &FailedTradeRecord) -> Result<()>;
}

/// Why a run aborted without submitting anything
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("insufficient data: {got} candles fetched, need {need}")]
    InsufficientData { got: usize, need: usize },
    #[error("market data unavailable: {0}")]
    MarketData(String),
    #[error("open position count unavailable: {0}")]
    Exposure(String),
    #[error("audit log write failed: {0}")]
    Audit(String),
}

/// Outcome of one pipeline invocation
#[derive(Debug, Clone)]
pub struct RunReport {
    pub signal: Signal,
    pub spread: f64,
    pub open_positions: usize,
    pub decisions: Vec<TradeDecision>,
}

/// The trading pipeline
///
/// Owns its collaborators by value (dependency injection, no globals)
/// and serializes invocations with a run lock: the exposure check is
/// only valid if no overlapping run can submit an order between reading
/// the count and submitting.
pub struct Engine<M, B, A> {
    market: M,
    broker: B,
    audit: A,
    config: BotConfig,
    features: FeatureConfig,
    run_lock: Mutex<()>,
}

impl<M: MarketData, B: Broker, A: AuditLog> Engine<M, B, A> {
    pub fn new(market: M, broker: B, audit: A, config: BotConfig) -> Self {
        let features = FeatureConfig {
            ema_fast_period: config.ema_fast_period,
            ema_slow_period: config.ema_slow_period,
            ..FeatureConfig::default()
        };

        Self {
            market,
            broker,
            audit,
            config,
            features,
            run_lock: Mutex::new(()),
        }
    }

    /// Candles required so every indicator column and the full lookback
    /// window are defined at the current index
    pub fn min_candles(&self) -> usize {
        self.features.min_candles() + self.config.backcandles
    }

    /// Execute one full pipeline invocation
    ///
    /// Every evaluated direction produces exactly one audit record;
    /// aborted runs produce a single failed-trade record, except
    /// insufficient-data skips which are only logged at process level.
    pub async fn run_once(&self) -> std::result::Result<RunReport, PipelineError> {
        let _guard = self.run_lock.lock().await;

        tracing::info!("Running trading job for {}", self.config.instrument);

        let candles = match self
            .market
            .fetch_candles(&self.config.instrument, self.config.candle_count)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                self.record_abort(Signal::None, "Market data unavailable")
                    .await;
                return Err(PipelineError::MarketData(e.to_string()));
            }
        };

        let need = self.min_candles();
        if candles.len() < need {
            tracing::warn!(
                "Skipping run: {} candles fetched, need {}",
                candles.len(),
                need
            );
            return Err(PipelineError::InsufficientData {
                got: candles.len(),
                need,
            });
        }

        let frame = FeatureFrame::compute(candles, &self.features)
            .map_err(|e| PipelineError::MarketData(e.to_string()))?;

        let current_index = frame.len() - 1;
        let signal = strategy::classify(
            &frame,
            current_index,
            self.config.backcandles,
            self.config.signal_policy,
        );

        let atr = frame
            .latest_atr()
            .ok_or(PipelineError::InsufficientData {
                got: frame.len(),
                need,
            })?;

        let quote = match self.market.latest_quote(&self.config.instrument).await {
            Ok(quote) => quote,
            Err(e) => {
                self.record_abort(signal, "Market data unavailable").await;
                return Err(PipelineError::MarketData(e.to_string()));
            }
        };
        let spread = quote.spread();

        let levels = compute_levels(
            atr,
            quote.bid_open,
            quote.ask_open,
            self.config.reward_risk_ratio,
            self.config.atr_multiplier,
        );

        // Never assume zero exposure when the count is unavailable
        let open_positions = match self
            .broker
            .count_open_positions(&self.config.instrument)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                self.record_abort(signal, "Open position count unavailable")
                    .await;
                return Err(PipelineError::Exposure(e.to_string()));
            }
        };

        tracing::info!(
            "Signal: {}, spread: {:.6}, ATR: {:.6}, open positions: {}",
            signal.as_str(),
            spread,
            atr,
            open_positions
        );

        let gate_config = GateConfig {
            max_spread: self.config.max_spread,
            units: self.config.trade_units,
            emit_mode: self.config.emit_mode,
        };
        let decisions = gate::decide(signal, &levels, open_positions, spread, &gate_config);

        for decision in &decisions {
            self.settle(signal, decision).await?;
        }

        Ok(RunReport {
            signal,
            spread,
            open_positions,
            decisions,
        })
    }

    /// Submit an accepted decision and write the audit record for it
    async fn settle(
        &self,
        signal: Signal,
        decision: &TradeDecision,
    ) -> std::result::Result<(), PipelineError> {
        if !decision.accepted {
            let reason = decision
                .rejection_reason
                .clone()
                .unwrap_or_else(|| "Conditions not met".to_string());
            tracing::info!("{} rejected: {}", decision.direction.as_str(), reason);
            return self
                .record_failure(signal, decision.direction, reason, decision.snapshot_price)
                .await;
        }

        match self
            .broker
            .submit_market_order(
                &self.config.instrument,
                decision.units,
                decision.risk_levels.take_profit,
                decision.risk_levels.stop_loss,
            )
            .await
        {
            Ok(order) => {
                tracing::info!(
                    "Order {} filled: {} {} units @ {:.5}",
                    order.id,
                    decision.direction.as_str(),
                    decision.units,
                    decision.snapshot_price
                );
                let record =
                    TradeRecord::new(signal, decision.direction, true, decision.snapshot_price, None);
                self.audit
                    .record_trade(&record)
                    .await
                    .map_err(|e| PipelineError::Audit(e.to_string()))
            }
            Err(e) => {
                tracing::warn!("Order rejected by broker: {}", e);
                self.record_failure(
                    signal,
                    decision.direction,
                    format!("Order rejected by broker: {}", e),
                    decision.snapshot_price,
                )
                .await
            }
        }
    }

    async fn record_failure(
        &self,
        signal: Signal,
        direction: Direction,
        reason: String,
        entry_price: f64,
    ) -> std::result::Result<(), PipelineError> {
        let record = FailedTradeRecord::new(signal, Some(direction), reason, Some(entry_price));
        self.audit
            .record_failed_trade(&record)
            .await
            .map_err(|e| PipelineError::Audit(e.to_string()))
    }

    /// Record an aborted run; audit failures here are logged, not
    /// propagated, so the original abort reason survives
    async fn record_abort(&self, signal: Signal, reason: &str) {
        let record = FailedTradeRecord::new(signal, None, reason, None);
        if let Err(e) = self.audit.record_failed_trade(&record).await {
            tracing::error!("Failed to record aborted run: {}", e);
        }
    }
}

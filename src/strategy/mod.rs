// Signal classifier: EMA-crossover bias over a lookback window combined
// with a Bollinger band condition at the current candle.

use crate::features::FeatureFrame;
use crate::models::Signal;
use serde::{Deserialize, Serialize};

/// Directional bias from the EMA crossover lookback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmaBias {
    Neutral,
    Buy,
    Sell,
}

/// How the EMA bias combines with the band condition
///
/// The reference strategy ORs the two conditions, which is permissive:
/// a band touch alone fires a signal even with no trend bias. Strict
/// requires both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPolicy {
    Strict,
    Permissive,
}

/// EMA crossover bias over the half-open window
/// `[max(0, current_index - backcandles), current_index)`
///
/// Strict unanimity: fast below slow on every window candle gives a Sell
/// bias, fast above slow on every candle gives a Buy bias. A single
/// equality, or an undefined EMA value, breaks unanimity. At index 0 the
/// window is empty and the bias is Neutral, not vacuously unanimous.
pub fn ema_bias(frame: &FeatureFrame, current_index: usize, backcandles: usize) -> EmaBias {
    if current_index == 0 {
        return EmaBias::Neutral;
    }

    let start = current_index.saturating_sub(backcandles);
    let window = start..current_index;

    let all_below = window.clone().all(|i| match (frame.ema_fast[i], frame.ema_slow[i]) {
        (Some(fast), Some(slow)) => fast < slow,
        _ => false,
    });
    if all_below {
        return EmaBias::Sell;
    }

    let all_above = window.clone().all(|i| match (frame.ema_fast[i], frame.ema_slow[i]) {
        (Some(fast), Some(slow)) => fast > slow,
        _ => false,
    });
    if all_above {
        return EmaBias::Buy;
    }

    EmaBias::Neutral
}

/// Classify the candle at `current_index`
///
/// Buy: Buy bias and/or close at or below the lower band.
/// Sell: Sell bias and/or close at or above the upper band.
/// The Buy branch is checked first; the first match wins. An undefined
/// band value makes its condition false.
pub fn classify(
    frame: &FeatureFrame,
    current_index: usize,
    backcandles: usize,
    policy: SignalPolicy,
) -> Signal {
    let bias = ema_bias(frame, current_index, backcandles);
    let close = frame.close(current_index);

    let below_lower = frame.bb_lower[current_index].is_some_and(|band| close <= band);
    let above_upper = frame.bb_upper[current_index].is_some_and(|band| close >= band);

    let (buy, sell) = match policy {
        SignalPolicy::Permissive => (
            bias == EmaBias::Buy || below_lower,
            bias == EmaBias::Sell || above_upper,
        ),
        SignalPolicy::Strict => (
            bias == EmaBias::Buy && below_lower,
            bias == EmaBias::Sell && above_upper,
        ),
    };

    if buy {
        Signal::Buy
    } else if sell {
        Signal::Sell
    } else {
        Signal::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureConfig, FeatureFrame};
    use crate::models::Candle;
    use chrono::Utc;

    fn frame_from_closes(closes: &[f64]) -> FeatureFrame {
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: Utc::now() + chrono::Duration::minutes(i as i64 * 5),
                open: close,
                high: close + 0.1,
                low: close - 0.1,
                close,
            })
            .collect();
        FeatureFrame::compute(candles, &FeatureConfig::default()).unwrap()
    }

    /// Frame with hand-set EMA columns for bias tests
    fn frame_with_emas(fast: Vec<Option<f64>>, slow: Vec<Option<f64>>) -> FeatureFrame {
        let closes = vec![100.0; fast.len()];
        let mut frame = frame_from_closes(&closes);
        frame.ema_fast = fast;
        frame.ema_slow = slow;
        frame
    }

    #[test]
    fn test_bias_neutral_at_index_zero() {
        let frame = frame_with_emas(vec![Some(1.0); 10], vec![Some(2.0); 10]);
        assert_eq!(ema_bias(&frame, 0, 7), EmaBias::Neutral);
    }

    #[test]
    fn test_bias_unanimous_sell() {
        let frame = frame_with_emas(vec![Some(1.0); 10], vec![Some(2.0); 10]);
        assert_eq!(ema_bias(&frame, 9, 7), EmaBias::Sell);
    }

    #[test]
    fn test_bias_unanimous_buy() {
        let frame = frame_with_emas(vec![Some(3.0); 10], vec![Some(2.0); 10]);
        assert_eq!(ema_bias(&frame, 9, 7), EmaBias::Buy);
    }

    #[test]
    fn test_single_violation_cancels_bias() {
        let mut fast = vec![Some(3.0); 10];
        fast[5] = Some(1.0); // one candle below slow
        let frame = frame_with_emas(fast, vec![Some(2.0); 10]);
        assert_eq!(ema_bias(&frame, 9, 7), EmaBias::Neutral);
    }

    #[test]
    fn test_equality_breaks_unanimity_both_ways() {
        let mut fast = vec![Some(3.0); 10];
        fast[5] = Some(2.0); // equal to slow
        let frame = frame_with_emas(fast, vec![Some(2.0); 10]);
        assert_eq!(ema_bias(&frame, 9, 7), EmaBias::Neutral);

        let mut fast = vec![Some(1.0); 10];
        fast[5] = Some(2.0);
        let frame = frame_with_emas(fast, vec![Some(2.0); 10]);
        assert_eq!(ema_bias(&frame, 9, 7), EmaBias::Neutral);
    }

    #[test]
    fn test_undefined_ema_breaks_unanimity() {
        let mut fast = vec![Some(3.0); 10];
        fast[4] = None;
        let frame = frame_with_emas(fast, vec![Some(2.0); 10]);
        assert_eq!(ema_bias(&frame, 9, 7), EmaBias::Neutral);
    }

    #[test]
    fn test_window_excludes_current_candle() {
        // Current candle violates the bias, but it sits outside the
        // half-open window, so unanimity still holds.
        let mut fast = vec![Some(3.0); 10];
        fast[9] = Some(1.0);
        let frame = frame_with_emas(fast, vec![Some(2.0); 10]);
        assert_eq!(ema_bias(&frame, 9, 7), EmaBias::Buy);
    }

    #[test]
    fn test_classify_buy_on_uptrend() {
        let closes: Vec<f64> = (0..70).map(|i| 100.0 + i as f64 * 0.5).collect();
        let frame = frame_from_closes(&closes);
        let last = frame.len() - 1;

        assert_eq!(ema_bias(&frame, last, 7), EmaBias::Buy);
        assert_eq!(
            classify(&frame, last, 7, SignalPolicy::Permissive),
            Signal::Buy
        );
    }

    #[test]
    fn test_classify_sell_on_downtrend() {
        // The final close bounces back inside the bands, so the Sell
        // comes from the EMA bias alone rather than a band touch
        let mut closes: Vec<f64> = (0..70).map(|i| 200.0 - i as f64 * 0.5).collect();
        closes[69] += 1.0;
        let frame = frame_from_closes(&closes);
        let last = frame.len() - 1;

        assert_eq!(ema_bias(&frame, last, 7), EmaBias::Sell);
        assert_eq!(
            classify(&frame, last, 7, SignalPolicy::Permissive),
            Signal::Sell
        );
    }

    #[test]
    fn test_classify_index_zero_never_biased() {
        let closes: Vec<f64> = (0..70).map(|i| 100.0 + i as f64 * 0.5).collect();
        let frame = frame_from_closes(&closes);

        assert_eq!(ema_bias(&frame, 0, 7), EmaBias::Neutral);
        // With no bias and no band data at index 0, nothing fires
        assert_eq!(
            classify(&frame, 0, 7, SignalPolicy::Permissive),
            Signal::None
        );
    }

    #[test]
    fn test_permissive_band_touch_fires_without_bias() {
        let closes = vec![100.0; 70];
        let mut frame = frame_from_closes(&closes);
        let last = frame.len() - 1;

        // No bias (flat EMAs are equal), but close sits on the lower band
        frame.bb_lower[last] = Some(100.0);
        frame.bb_upper[last] = Some(110.0);

        assert_eq!(ema_bias(&frame, last, 7), EmaBias::Neutral);
        assert_eq!(
            classify(&frame, last, 7, SignalPolicy::Permissive),
            Signal::Buy
        );
        assert_eq!(classify(&frame, last, 7, SignalPolicy::Strict), Signal::None);
    }

    #[test]
    fn test_strict_requires_bias_and_band() {
        let closes: Vec<f64> = (0..70).map(|i| 100.0 + i as f64 * 0.5).collect();
        let mut frame = frame_from_closes(&closes);
        let last = frame.len() - 1;

        // Buy bias from the uptrend, but price is above the lower band
        frame.bb_lower[last] = Some(0.0);
        assert_eq!(classify(&frame, last, 7, SignalPolicy::Strict), Signal::None);

        // Pull the lower band up to the close: both conditions hold
        frame.bb_lower[last] = Some(frame.close(last));
        assert_eq!(classify(&frame, last, 7, SignalPolicy::Strict), Signal::Buy);
    }

    #[test]
    fn test_buy_checked_before_sell() {
        let closes = vec![100.0; 70];
        let mut frame = frame_from_closes(&closes);
        let last = frame.len() - 1;

        // Degenerate bands make both conditions fire; Buy wins
        frame.bb_lower[last] = Some(100.0);
        frame.bb_upper[last] = Some(100.0);

        assert_eq!(
            classify(&frame, last, 7, SignalPolicy::Permissive),
            Signal::Buy
        );
    }

    #[test]
    fn test_undefined_band_condition_is_false() {
        let closes = vec![100.0; 70];
        let mut frame = frame_from_closes(&closes);
        let last = frame.len() - 1;

        frame.bb_lower[last] = None;
        frame.bb_upper[last] = None;

        assert_eq!(
            classify(&frame, last, 7, SignalPolicy::Permissive),
            Signal::None
        );
    }
}

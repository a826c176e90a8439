/// Calculate a Relative Strength Index (RSI) series
///
/// Wilder's formula over close-to-close deltas: the first value (at
/// index `period`) uses simple averages of the first `period` gains and
/// losses, subsequent values use Wilder's smoothing. When the average
/// loss is zero the RSI saturates at 100.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    assert!(period > 0, "RSI period must be positive");

    let mut out = vec![None; closes.len()];
    if closes.len() < period + 1 {
        return out;
    }

    let gain = |i: usize| (closes[i] - closes[i - 1]).max(0.0);
    let loss = |i: usize| (closes[i - 1] - closes[i]).max(0.0);

    let mut avg_gain: f64 = (1..=period).map(gain).sum::<f64>() / period as f64;
    let mut avg_loss: f64 = (1..=period).map(loss).sum::<f64>() / period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in period + 1..closes.len() {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain(i)) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss(i)) / period as f64;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

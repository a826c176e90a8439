use super::moving_average::sma_series;
use crate::models::Candle;

/// Stochastic Oscillator series: %K over a high/low range window and %D
/// as a short moving average of %K
#[derive(Debug, Clone)]
pub struct Stochastic {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

/// Calculate the Stochastic Oscillator
///
/// %K is defined from index `k_period - 1`; %D needs a further
/// `d_period - 1` %K values. A flat high/low range yields a neutral 50.
pub fn stochastic_series(candles: &[Candle], k_period: usize, d_period: usize) -> Stochastic {
    assert!(k_period > 0 && d_period > 0, "Stochastic periods must be positive");

    let mut k = vec![None; candles.len()];

    for i in k_period - 1..candles.len() {
        let window = &candles[i + 1 - k_period..=i];
        let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);

        let range = highest - lowest;
        k[i] = if range == 0.0 {
            Some(50.0)
        } else {
            Some((candles[i].close - lowest) / range * 100.0)
        };
    }

    // %D is an SMA over the defined tail of %K
    let offset = k.iter().position(|v| v.is_some()).unwrap_or(k.len());
    let dense: Vec<f64> = k[offset..].iter().copied().flatten().collect();

    let mut d = vec![None; candles.len()];
    for (i, v) in sma_series(&dense, d_period).into_iter().enumerate() {
        d[offset + i] = v;
    }

    Stochastic { k, d }
}

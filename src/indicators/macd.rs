use super::moving_average::ema_series;

/// MACD series: `EMA(fast) - EMA(slow)` line, an EMA of that line as the
/// signal, and their difference as the histogram
#[derive(Debug, Clone)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Calculate MACD over `closes`
///
/// The line is defined from index `slow - 1`; the signal (and histogram)
/// need a further `signal_period - 1` line values.
pub fn macd_series(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> Macd {
    assert!(fast < slow, "MACD fast period must be shorter than slow");

    let ema_fast = ema_series(closes, fast);
    let ema_slow = ema_series(closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // The signal EMA runs over the defined tail of the line only
    let offset = line.iter().position(|v| v.is_some()).unwrap_or(line.len());
    let dense: Vec<f64> = line[offset..].iter().copied().flatten().collect();

    let mut signal = vec![None; closes.len()];
    for (i, v) in ema_series(&dense, signal_period).into_iter().enumerate() {
        signal[offset + i] = v;
    }

    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    Macd {
        line,
        signal,
        histogram,
    }
}

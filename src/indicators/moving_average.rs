/// Calculate a Simple Moving Average series
///
/// Returns one value per input position; positions before the first
/// full window are None.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    assert!(period > 0, "SMA period must be positive");

    let mut out = vec![None; values.len()];
    if values.len() < period {
        return out;
    }

    let mut window_sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(window_sum / period as f64);

    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        out[i] = Some(window_sum / period as f64);
    }

    out
}

/// Calculate an Exponential Moving Average series
///
/// Uses the standard smoothing factor `2 / (period + 1)`, seeded by the
/// simple average of the first `period` values. The first defined value
/// is at index `period - 1`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    assert!(period > 0, "EMA period must be positive");

    let mut out = vec![None; values.len()];
    if values.len() < period {
        return out;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Seed with SMA of the first window
    let mut ema: f64 = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(ema);

    for i in period..values.len() {
        ema = (values[i] - ema) * multiplier + ema;
        out[i] = Some(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_values() {
        let values = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = sma_series(&values, 5);

        assert_eq!(sma[..4], [None, None, None, None]);
        assert_eq!(sma[4], Some(104.0));
    }

    #[test]
    fn test_sma_rolls_forward() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let sma = sma_series(&values, 3);

        assert_eq!(sma[2], Some(2.0));
        assert_eq!(sma[3], Some(3.0));
        assert_eq!(sma[5], Some(5.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let values = vec![100.0, 102.0];
        let sma = sma_series(&values, 5);
        assert!(sma.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_ema_seeded_by_sma() {
        let values = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let ema = ema_series(&values, 5);

        assert_eq!(ema[..4], [None, None, None, None]);
        assert_eq!(ema[4], Some(104.0)); // seed = SMA of first 5

        // next: (110 - 104) * 2/6 + 104 = 106
        assert!((ema[5].unwrap() - 106.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_tracks_constant_series() {
        let values = vec![50.0; 10];
        let ema = ema_series(&values, 4);
        for v in ema.iter().skip(3) {
            assert_eq!(*v, Some(50.0));
        }
    }
}

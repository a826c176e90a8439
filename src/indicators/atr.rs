/// Average True Range (ATR) indicator
///
/// Measures market volatility by averaging true ranges over a period.
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
///
/// Uses Wilder's smoothing (same as RSI) seeded by the simple mean of
/// the first `period` true ranges.
use crate::models::Candle;

/// Calculate the ATR series for the given candles
///
/// Returns one value per candle; the first defined value is at index
/// `period` (a true range needs a previous close, so `period` true
/// ranges exist only from that point).
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    assert!(period > 0, "ATR period must be positive");

    let mut out = vec![None; candles.len()];
    if candles.len() < period + 1 {
        return out;
    }

    let true_range = |i: usize| -> f64 {
        let high = candles[i].high;
        let low = candles[i].low;
        let prev_close = candles[i - 1].close;

        (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs())
    };

    // First ATR is the simple average of the first 'period' true ranges
    let mut atr: f64 = (1..=period).map(true_range).sum::<f64>() / period as f64;
    out[period] = Some(atr);

    // Wilder's smoothing for subsequent values
    for i in period + 1..candles.len() {
        atr = (atr * (period as f64 - 1.0) + true_range(i)) / period as f64;
        out[i] = Some(atr);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_candles(prices: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Candle {
                timestamp: Utc::now() + chrono::Duration::minutes(i as i64 * 5),
                open,
                high,
                low,
                close,
            })
            .collect()
    }

    #[test]
    fn test_atr_leading_values_unavailable() {
        let prices = vec![(100.0, 101.0, 99.0, 100.0); 12];
        let candles = create_test_candles(&prices);
        let atr = atr_series(&candles, 7);

        assert!(atr[..7].iter().all(|v| v.is_none()));
        assert!(atr[7..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_atr_constant_range() {
        // Every candle spans exactly 2.0 with no gaps
        let prices = vec![(100.0, 101.0, 99.0, 100.0); 15];
        let candles = create_test_candles(&prices);
        let atr = atr_series(&candles, 7);

        for v in atr.iter().flatten() {
            assert!((v - 2.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_atr_gap_counts_toward_range() {
        // Second candle gaps up: TR = |high - prev_close| = 9.0
        let prices = vec![
            (100.0, 101.0, 99.0, 100.0),
            (108.0, 109.0, 107.0, 108.0),
            (108.0, 109.0, 107.0, 108.0),
        ];
        let candles = create_test_candles(&prices);
        let atr = atr_series(&candles, 2);

        // mean of TR(1)=9.0 and TR(2)=2.0
        assert!((atr[2].unwrap() - 5.5).abs() < 1e-10);
    }

    #[test]
    fn test_atr_insufficient_data() {
        let prices = vec![(100.0, 101.0, 99.0, 100.0); 3];
        let candles = create_test_candles(&prices);
        let atr = atr_series(&candles, 7);

        assert!(atr.iter().all(|v| v.is_none()));
    }
}

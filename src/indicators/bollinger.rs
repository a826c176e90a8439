use super::moving_average::sma_series;

/// Bollinger Band series: SMA mid-band with bands at +/- `std_dev`
/// population standard deviations
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub lower: Vec<Option<f64>>,
    pub mid: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands over `closes`
///
/// All three series are aligned with the input; the first defined value
/// is at index `period - 1`.
pub fn bollinger_series(closes: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    assert!(period > 0, "Bollinger period must be positive");

    let mid = sma_series(closes, period);
    let mut lower = vec![None; closes.len()];
    let mut upper = vec![None; closes.len()];

    for i in period - 1..closes.len() {
        let mean = match mid[i] {
            Some(m) => m,
            None => continue,
        };
        let window = &closes[i + 1 - period..=i];
        let variance =
            window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / period as f64;
        let band_width = std_dev * variance.sqrt();

        lower[i] = Some(mean - band_width);
        upper[i] = Some(mean + band_width);
    }

    BollingerBands { lower, mid, upper }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub upper: i64,
    pub middle: i64,
    pub lower: i64,
}

/// Bollinger envelope over a trailing window using population standard
/// deviation. `None` until `period` points are available.
pub fn bollinger_bands(prices: &[u64], period: usize, multiplier: f64) -> Vec<Option<Band>> {
    prices
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window = &prices[i + 1 - period..=i];
            let n = period as f64;
            let mean = window.iter().map(|&p| p as f64).sum::<f64>() / n;
            let variance = window
                .iter()
                .map(|&p| {
                    let d = p as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let width = multiplier.abs() * variance.sqrt();
            Some(Band {
                upper: (mean + width).round() as i64,
                middle: mean.round() as i64,
                lower: (mean - width).round() as i64,
            })
        })
        .collect()
}

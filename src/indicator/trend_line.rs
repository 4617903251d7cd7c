/// Naive next-price projection: extend the relative move across the trailing
/// window once more. The window shrinks to the history length when the
/// history is shorter than `period`.
pub fn trend_projection(prices: &[u64], period: usize) -> Vec<Option<u64>> {
    let window = period.min(prices.len());
    prices
        .iter()
        .enumerate()
        .map(|(i, &last)| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let first = prices[i + 1 - window];
            if first == 0 {
                return None;
            }
            let trend = (last as f64 - first as f64) / first as f64;
            Some((last as f64 * (1.0 + trend)).round().max(0.0) as u64)
        })
        .collect()
}

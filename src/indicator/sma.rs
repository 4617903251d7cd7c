use std::collections::VecDeque;

/// Trailing mean over integer prices with an exact running sum.
#[derive(Debug, Clone)]
pub struct RollingMean {
    period: usize,
    window: VecDeque<u64>,
    sum: u128,
}

impl RollingMean {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "moving average period must be > 0");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0,
        }
    }

    /// Push a new value, return the current mean if the window is full.
    pub fn push(&mut self, value: u64) -> Option<f64> {
        if self.window.len() == self.period {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest as u128;
            }
        }
        self.window.push_back(value);
        self.sum += value as u128;
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.is_ready() {
            Some(self.sum as f64 / self.period as f64)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() >= self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// One entry per price: `None` for the first `period - 1` points, then the
/// rounded mean of the trailing `period` prices.
pub fn moving_average(prices: &[u64], period: usize) -> Vec<Option<u64>> {
    if period == 0 {
        return vec![None; prices.len()];
    }
    let mut mean = RollingMean::new(period);
    prices
        .iter()
        .map(|&p| mean.push(p).map(|v| v.round() as u64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_fills_then_slides() {
        let mut m = RollingMean::new(3);
        assert_eq!(m.push(10), None);
        assert_eq!(m.push(20), None);
        assert!(!m.is_ready());
        assert_eq!(m.push(30), Some(20.0));
        assert_eq!(m.push(40), Some(30.0));
        assert_eq!(m.push(60), Some(130.0 / 3.0));
    }

    #[test]
    fn moving_average_example_series() {
        let ma = moving_average(&[100, 102, 98, 105, 110], 3);
        assert_eq!(ma, vec![None, None, Some(100), Some(102), Some(104)]);
    }

    #[test]
    fn period_one_echoes_prices() {
        assert_eq!(moving_average(&[5, 7], 1), vec![Some(5), Some(7)]);
    }

    #[test]
    fn zero_period_is_undefined_everywhere() {
        assert_eq!(moving_average(&[5, 7], 0), vec![None, None]);
    }

    #[test]
    #[should_panic(expected = "moving average period must be > 0")]
    fn zero_period_panics() {
        RollingMean::new(0);
    }
}

pub const DEFAULT_HISTORY_LEN: usize = 200;

/// Bounded price history. Never empty; the last element is the current price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    prices: Vec<u64>,
    max_len: usize,
}

impl PriceSeries {
    pub fn new(initial: u64, max_len: usize) -> Self {
        let max_len = max_len.max(1);
        let mut prices = Vec::with_capacity(max_len + 1);
        prices.push(initial);
        Self { prices, max_len }
    }

    pub fn push(&mut self, price: u64) {
        self.prices.push(price);
        if self.prices.len() > self.max_len {
            let excess = self.prices.len() - self.max_len;
            self.prices.drain(..excess);
        }
    }

    pub fn current(&self) -> u64 {
        // `new` seeds one element and `push` never drains below `max_len >= 1`.
        self.prices[self.prices.len() - 1]
    }

    pub fn previous(&self) -> Option<u64> {
        self.prices.len().checked_sub(2).map(|i| self.prices[i])
    }

    /// Percent change of the last tick, `0.0` with a single point.
    pub fn change_percent(&self) -> f64 {
        match self.previous() {
            Some(prev) if prev > 0 => {
                (self.current() as f64 - prev as f64) / prev as f64 * 100.0
            }
            _ => 0.0,
        }
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

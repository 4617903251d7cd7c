use serde::Deserialize;

use super::bollinger::{bollinger_bands, Band};
use super::sma::moving_average;
use super::trend_line::trend_projection;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    pub band_period: usize,
    pub band_multiplier: f64,
    pub trend_period: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            short_ma_period: 3,
            long_ma_period: 10,
            band_period: 10,
            band_multiplier: 2.0,
            trend_period: 10,
        }
    }
}

/// Derived series drawn over the price line, index-aligned with the history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartOverlay {
    pub short_ma: Vec<Option<u64>>,
    pub long_ma: Vec<Option<u64>>,
    pub bands: Vec<Option<Band>>,
    pub trend: Vec<Option<u64>>,
}

impl ChartOverlay {
    pub fn compute(prices: &[u64], cfg: &AnalyticsConfig) -> Self {
        Self {
            short_ma: moving_average(prices, cfg.short_ma_period),
            long_ma: moving_average(prices, cfg.long_ma_period),
            bands: bollinger_bands(prices, cfg.band_period, cfg.band_multiplier),
            trend: trend_projection(prices, cfg.trend_period),
        }
    }

    pub fn len(&self) -> usize {
        self.short_ma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.short_ma.is_empty()
    }

    pub fn latest_short_ma(&self) -> Option<u64> {
        self.short_ma.last().copied().flatten()
    }

    pub fn latest_long_ma(&self) -> Option<u64> {
        self.long_ma.last().copied().flatten()
    }

    pub fn latest_band(&self) -> Option<Band> {
        self.bands.last().copied().flatten()
    }

    pub fn latest_trend(&self) -> Option<u64> {
        self.trend.last().copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_align_with_history() {
        let prices: Vec<u64> = (0..25).map(|i| 50_000 + i * 100).collect();
        let overlay = ChartOverlay::compute(&prices, &AnalyticsConfig::default());
        assert_eq!(overlay.len(), prices.len());
        assert_eq!(overlay.long_ma.len(), prices.len());
        assert_eq!(overlay.bands.len(), prices.len());
        assert_eq!(overlay.trend.len(), prices.len());
        assert!(overlay.short_ma[1].is_none());
        assert!(overlay.short_ma[2].is_some());
        assert!(overlay.long_ma[8].is_none());
        assert!(overlay.long_ma[9].is_some());
        assert_eq!(overlay.latest_short_ma(), Some(52_300));
    }
}

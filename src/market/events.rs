use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::portfolio::Portfolio;

pub const DEFAULT_EVENT_PROBABILITY: f64 = 0.01;

const SURGE_FACTOR: f64 = 1.2;
const CRASH_FACTOR: f64 = 0.8;
const DIVIDEND_RATE: f64 = 0.1;
const SPLIT_RATIO: u64 = 2;

/// One-shot market shock. Applied once when rolled; leaves only a log line behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketEvent {
    Surge,
    Crash,
    Dividend,
    Split,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventOutcome {
    pub event: MarketEvent,
    pub price: u64,
    pub dividend: u64,
    pub message: String,
}

impl MarketEvent {
    pub const ALL: [MarketEvent; 4] = [
        MarketEvent::Surge,
        MarketEvent::Crash,
        MarketEvent::Dividend,
        MarketEvent::Split,
    ];

    /// Fires with `probability`, then picks one event uniformly.
    pub fn roll<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> Option<MarketEvent> {
        if rng.gen::<f64>() < probability {
            Some(Self::ALL[rng.gen_range(0..Self::ALL.len())])
        } else {
            None
        }
    }

    pub fn apply(self, price: u64, portfolio: &mut Portfolio) -> EventOutcome {
        match self {
            Self::Surge => EventOutcome {
                event: self,
                price: scale(price, SURGE_FACTOR),
                dividend: 0,
                message: "Market surge! Price jumped 20%".to_string(),
            },
            Self::Crash => EventOutcome {
                event: self,
                price: scale(price, CRASH_FACTOR),
                dividend: 0,
                message: "Market crash! Price fell 20%".to_string(),
            },
            Self::Dividend => {
                let dividend = scale(portfolio.holdings_value(price), DIVIDEND_RATE);
                portfolio.credit(dividend);
                EventOutcome {
                    event: self,
                    price,
                    dividend,
                    message: format!("Special dividend paid: {}", dividend),
                }
            }
            Self::Split => {
                portfolio.split(SPLIT_RATIO);
                EventOutcome {
                    event: self,
                    price: scale(price, 1.0 / SPLIT_RATIO as f64),
                    dividend: 0,
                    message: format!("Stock split {}:1", SPLIT_RATIO),
                }
            }
        }
    }
}

impl fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Surge => "surge",
            Self::Crash => "crash",
            Self::Dividend => "dividend",
            Self::Split => "split",
        };
        f.write_str(label)
    }
}

fn scale(value: u64, factor: f64) -> u64 {
    (value as f64 * factor).round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn surge_and_crash_scale_price_only() {
        let mut pf = Portfolio::new(1_000);
        assert_eq!(MarketEvent::Surge.apply(50_000, &mut pf).price, 60_000);
        assert_eq!(MarketEvent::Crash.apply(50_000, &mut pf).price, 40_000);
        assert_eq!(pf, Portfolio::new(1_000));
    }

    #[test]
    fn dividend_credits_ten_percent_of_holdings_value() {
        let mut pf = Portfolio::new(1_000_000);
        pf.buy(4, 50_000).unwrap();
        let out = MarketEvent::Dividend.apply(50_000, &mut pf);
        assert_eq!(out.dividend, 20_000);
        assert_eq!(out.price, 50_000);
        assert_eq!(pf.cash, 820_000);
    }

    #[test]
    fn split_doubles_holdings_and_halves_price() {
        let mut pf = Portfolio::new(1_000_000);
        pf.buy(3, 50_001).unwrap();
        let out = MarketEvent::Split.apply(50_001, &mut pf);
        assert_eq!(pf.holdings, 6);
        assert_eq!(out.price, 25_001);
    }

    #[test]
    fn roll_respects_probability_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            assert_eq!(MarketEvent::roll(0.0, &mut rng), None);
            assert!(MarketEvent::roll(1.0, &mut rng).is_some());
        }
    }
}

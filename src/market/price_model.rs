use rand::Rng;

pub const DEFAULT_PRICE_FLOOR: u64 = 1_000;

/// Smoothed random-walk bias. Stays within `[-0.5, 0.5]` when started there,
/// since each step is a convex combination of the old value and fresh noise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrendState {
    value: f64,
}

impl TrendState {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn advance(self, strength: f64, noise: f64) -> Self {
        let strength = strength.clamp(0.0, 1.0);
        Self {
            value: self.value * strength + noise * (1.0 - strength),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceParams {
    pub volatility: f64,
    pub trend_strength: f64,
    pub floor: u64,
}

/// What active modifiers ask of the next price step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceEffects {
    pub pegged_price: Option<u64>,
    pub double_gain: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStep {
    pub price: u64,
    pub trend: TrendState,
}

pub fn next_price<R: Rng + ?Sized>(
    current: u64,
    trend: TrendState,
    params: &PriceParams,
    effects: &PriceEffects,
    rng: &mut R,
) -> PriceStep {
    let noise = rng.gen_range(-0.5..0.5);
    let trend = trend.advance(params.trend_strength, noise);

    if let Some(pegged) = effects.pegged_price {
        return PriceStep {
            price: pegged,
            trend,
        };
    }

    let mut change = trend.value() * params.volatility;
    if effects.double_gain {
        change *= if change > 0.0 { 2.0 } else { 0.5 };
    }

    PriceStep {
        price: apply_change(current, change, params.floor),
        trend,
    }
}

/// `current * (1 + change)`, rounded and clamped to `floor`.
pub fn apply_change(current: u64, change: f64, floor: u64) -> u64 {
    let next = (current as f64 * (1.0 + change)).round();
    if next.is_nan() || next < floor as f64 {
        floor
    } else {
        next as u64
    }
}

//! Purchasable, time-boxed price/clock modifiers.
//!
//! A modifier is created on purchase and is active from that instant until
//! `elapsed >= duration`, after which it is dropped from the book. At most one
//! modifier per [`ItemKind`] is active at a time.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::market::price_model::PriceEffects;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    TimeFreeze,
    PricePeg,
    DoubleGain,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::TimeFreeze, ItemKind::PricePeg, ItemKind::DoubleGain];

    pub fn label(self) -> &'static str {
        match self {
            Self::TimeFreeze => "Time Freeze",
            Self::PricePeg => "Price Peg",
            Self::DoubleGain => "Double Gain",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind-specific payload captured at activation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierEffect {
    TimeFreeze,
    PricePeg { fixed_price: u64 },
    DoubleGain { reference_price: u64 },
}

impl ModifierEffect {
    pub fn for_kind(kind: ItemKind, current_price: u64) -> Self {
        match kind {
            ItemKind::TimeFreeze => Self::TimeFreeze,
            ItemKind::PricePeg => Self::PricePeg {
                fixed_price: current_price,
            },
            ItemKind::DoubleGain => Self::DoubleGain {
                reference_price: current_price,
            },
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::TimeFreeze => ItemKind::TimeFreeze,
            Self::PricePeg { .. } => ItemKind::PricePeg,
            Self::DoubleGain { .. } => ItemKind::DoubleGain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierPhase {
    Active,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier {
    pub effect: ModifierEffect,
    pub activated_at_ms: u64,
    pub duration_ms: u64,
}

impl Modifier {
    pub fn kind(&self) -> ItemKind {
        self.effect.kind()
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.activated_at_ms)
    }

    pub fn phase(&self, now_ms: u64) -> ModifierPhase {
        if self.elapsed_ms(now_ms) >= self.duration_ms {
            ModifierPhase::Expired
        } else {
            ModifierPhase::Active
        }
    }

    /// Whole seconds left, rounded up.
    pub fn remaining_secs(&self, now_ms: u64) -> u64 {
        self.duration_ms
            .saturating_sub(self.elapsed_ms(now_ms))
            .div_ceil(1_000)
    }

    /// Percent move since a double gain was armed; `None` for other kinds.
    pub fn gain_since_activation(&self, current_price: u64) -> Option<f64> {
        match self.effect {
            ModifierEffect::DoubleGain { reference_price } if reference_price > 0 => {
                Some((current_price as f64 / reference_price as f64 - 1.0) * 100.0)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPolicy {
    /// Each item can be bought once per game.
    #[default]
    SingleUse,
    /// Items can be bought again once the previous instance expired.
    Rearmable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub price: u64,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemCatalog {
    pub time_freeze: ItemSpec,
    pub price_peg: ItemSpec,
    pub double_gain: ItemSpec,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self {
            time_freeze: ItemSpec {
                price: 50_000,
                duration_secs: 10,
            },
            price_peg: ItemSpec {
                price: 30_000,
                duration_secs: 5,
            },
            double_gain: ItemSpec {
                price: 100_000,
                duration_secs: 15,
            },
        }
    }
}

impl ItemCatalog {
    pub fn spec(&self, kind: ItemKind) -> ItemSpec {
        match kind {
            ItemKind::TimeFreeze => self.time_freeze,
            ItemKind::PricePeg => self.price_peg,
            ItemKind::DoubleGain => self.double_gain,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModifierBook {
    policy: ItemPolicy,
    active: Vec<Modifier>,
    used: HashSet<ItemKind>,
    purchases: u32,
}

impl ModifierBook {
    pub fn new(policy: ItemPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Checks the per-kind rules only; funds are the caller's concern.
    pub fn can_purchase(&self, kind: ItemKind) -> Result<(), GameError> {
        if self.is_active(kind) {
            return Err(GameError::ItemActive(kind));
        }
        if self.policy == ItemPolicy::SingleUse && self.used.contains(&kind) {
            return Err(GameError::ItemUsed(kind));
        }
        Ok(())
    }

    pub fn activate(&mut self, effect: ModifierEffect, now_ms: u64, duration_ms: u64) -> Modifier {
        let kind = effect.kind();
        self.active.retain(|m| m.kind() != kind);
        let modifier = Modifier {
            effect,
            activated_at_ms: now_ms,
            duration_ms,
        };
        self.active.push(modifier);
        self.used.insert(kind);
        self.purchases += 1;
        modifier
    }

    /// Drops every modifier whose duration has elapsed and returns their kinds.
    pub fn expire(&mut self, now_ms: u64) -> Vec<ItemKind> {
        let mut expired = Vec::new();
        self.active.retain(|m| {
            if m.phase(now_ms) == ModifierPhase::Expired {
                expired.push(m.kind());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn get(&self, kind: ItemKind) -> Option<&Modifier> {
        self.active.iter().find(|m| m.kind() == kind)
    }

    pub fn is_active(&self, kind: ItemKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_used(&self, kind: ItemKind) -> bool {
        self.used.contains(&kind)
    }

    pub fn active(&self) -> &[Modifier] {
        &self.active
    }

    /// Total purchases this game, counting re-arms.
    pub fn purchases(&self) -> u32 {
        self.purchases
    }

    pub fn is_clock_frozen(&self) -> bool {
        self.is_active(ItemKind::TimeFreeze)
    }

    pub fn price_effects(&self) -> PriceEffects {
        let mut effects = PriceEffects::default();
        for m in &self.active {
            match m.effect {
                ModifierEffect::PricePeg { fixed_price } => effects.pegged_price = Some(fixed_price),
                ModifierEffect::DoubleGain { .. } => effects.double_gain = true,
                ModifierEffect::TimeFreeze => {}
            }
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_expires_when_elapsed_reaches_duration() {
        let m = Modifier {
            effect: ModifierEffect::TimeFreeze,
            activated_at_ms: 1_000,
            duration_ms: 5_000,
        };
        assert_eq!(m.phase(5_999), ModifierPhase::Active);
        assert_eq!(m.phase(6_000), ModifierPhase::Expired);
        assert_eq!(m.remaining_secs(1_500), 5);
        assert_eq!(m.remaining_secs(5_001), 1);
        assert_eq!(m.remaining_secs(7_000), 0);
    }

    #[test]
    fn single_use_blocks_repurchase_after_expiry() {
        let mut book = ModifierBook::new(ItemPolicy::SingleUse);
        book.activate(ModifierEffect::TimeFreeze, 0, 1_000);
        assert_eq!(
            book.can_purchase(ItemKind::TimeFreeze),
            Err(GameError::ItemActive(ItemKind::TimeFreeze))
        );
        assert_eq!(book.expire(1_000), vec![ItemKind::TimeFreeze]);
        assert_eq!(
            book.can_purchase(ItemKind::TimeFreeze),
            Err(GameError::ItemUsed(ItemKind::TimeFreeze))
        );
    }

    #[test]
    fn rearmable_allows_repurchase_only_when_inactive() {
        let mut book = ModifierBook::new(ItemPolicy::Rearmable);
        book.activate(ModifierEffect::DoubleGain { reference_price: 10 }, 0, 1_000);
        assert!(book.can_purchase(ItemKind::DoubleGain).is_err());
        book.expire(2_000);
        assert!(book.can_purchase(ItemKind::DoubleGain).is_ok());
        book.activate(ModifierEffect::DoubleGain { reference_price: 12 }, 2_000, 1_000);
        assert_eq!(book.purchases(), 2);
        assert_eq!(book.active().len(), 1);
    }

    #[test]
    fn double_gain_reports_move_since_activation() {
        let gain = Modifier {
            effect: ModifierEffect::for_kind(ItemKind::DoubleGain, 50_000),
            activated_at_ms: 0,
            duration_ms: 15_000,
        };
        let pct = gain.gain_since_activation(55_000).unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
        let freeze = Modifier {
            effect: ModifierEffect::TimeFreeze,
            ..gain
        };
        assert_eq!(freeze.gain_since_activation(55_000), None);
    }

    #[test]
    fn price_effects_reflect_active_modifiers() {
        let mut book = ModifierBook::new(ItemPolicy::SingleUse);
        assert_eq!(book.price_effects(), PriceEffects::default());
        book.activate(ModifierEffect::for_kind(ItemKind::PricePeg, 60_000), 0, 5_000);
        book.activate(ModifierEffect::for_kind(ItemKind::DoubleGain, 60_000), 0, 15_000);
        let effects = book.price_effects();
        assert_eq!(effects.pegged_price, Some(60_000));
        assert!(effects.double_gain);
        assert!(!book.is_clock_frozen());

        book.expire(5_000);
        assert_eq!(book.price_effects().pegged_price, None);
        assert!(book.price_effects().double_gain);
    }

    #[test]
    fn catalog_defaults_match_shop_prices() {
        let catalog = ItemCatalog::default();
        assert_eq!(catalog.spec(ItemKind::TimeFreeze).price, 50_000);
        assert_eq!(catalog.spec(ItemKind::PricePeg).duration_secs, 5);
        assert_eq!(catalog.spec(ItemKind::DoubleGain).price, 100_000);
    }
}

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::indicator::overlay::AnalyticsConfig;
use crate::market::events::DEFAULT_EVENT_PROBABILITY;
use crate::market::price_model::DEFAULT_PRICE_FLOOR;
use crate::model::difficulty::Difficulty;
use crate::model::price_series::DEFAULT_HISTORY_LEN;
use crate::modifier::{ItemCatalog, ItemPolicy};

pub const ADMIN_SECRET_ENV: &str = "STOCK_RUSH_ADMIN_SECRET";
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub difficulty: DifficultyTable,
    pub items: ItemsConfig,
    pub analytics: AnalyticsConfig,
    pub leaderboard: LeaderboardConfig,
    pub admin: AdminConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_cash: u64,
    pub initial_price: u64,
    pub duration_secs: u64,
    pub price_floor: u64,
    pub history_len: usize,
    pub event_probability: f64,
    pub event_log_len: usize,
    pub clock_interval: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_cash: 1_000_000,
            initial_price: 50_000,
            duration_secs: 120,
            price_floor: DEFAULT_PRICE_FLOOR,
            history_len: DEFAULT_HISTORY_LEN,
            event_probability: DEFAULT_EVENT_PROBABILITY,
            event_log_len: 5,
            clock_interval: "1s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DifficultyProfile {
    pub volatility: f64,
    pub trend_strength: f64,
    pub tick_interval: String,
}

impl DifficultyProfile {
    pub fn tick_interval_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.tick_interval)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: DifficultyProfile,
    pub normal: DifficultyProfile,
    pub hard: DifficultyProfile,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyProfile {
                volatility: 0.015,
                trend_strength: 0.3,
                tick_interval: "1s".to_string(),
            },
            normal: DifficultyProfile {
                volatility: 0.02,
                trend_strength: 0.5,
                tick_interval: "800ms".to_string(),
            },
            hard: DifficultyProfile {
                volatility: 0.03,
                trend_strength: 0.7,
                tick_interval: "600ms".to_string(),
            },
        }
    }
}

impl DifficultyTable {
    pub fn profile(&self, difficulty: Difficulty) -> &DifficultyProfile {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemsConfig {
    pub policy: ItemPolicy,
    #[serde(flatten)]
    pub catalog: ItemCatalog,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub capacity: usize,
    pub store_path: PathBuf,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            capacity: crate::leaderboard::LEADERBOARD_CAPACITY,
            store_path: PathBuf::from("data/stock_rush.sqlite"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub secret: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            secret: "admin123!@#".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub default_quantity: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            default_quantity: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: PathBuf::from("stock-rush.log"),
        }
    }
}

/// Parse an interval string (e.g. "600ms", "1s", "2m") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let s = s.trim();
    let (num_str, unit_ms) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else {
        bail!(
            "invalid interval '{}': unsupported suffix, expected one of ms/s/m",
            s
        );
    };

    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = Path::new(DEFAULT_CONFIG_PATH);
        let mut config = if config_path.exists() {
            Self::from_path(config_path)?
        } else {
            tracing::warn!(path = %config_path.display(), "config file missing, using defaults");
            Self::default()
        };

        if let Ok(secret) = std::env::var(ADMIN_SECRET_ENV) {
            if !secret.is_empty() {
                config.admin.secret = secret;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        for difficulty in Difficulty::ALL {
            let profile = self.difficulty.profile(difficulty);
            profile
                .tick_interval_ms()
                .with_context(|| format!("difficulty.{}.tick_interval is invalid", difficulty))?;
            if !(0.0..=1.0).contains(&profile.trend_strength) {
                bail!(
                    "difficulty.{}.trend_strength must be within [0, 1], got {}",
                    difficulty,
                    profile.trend_strength
                );
            }
            if !profile.volatility.is_finite() || profile.volatility < 0.0 {
                bail!(
                    "difficulty.{}.volatility must be a non-negative number",
                    difficulty
                );
            }
        }
        parse_interval_ms(&self.game.clock_interval).context("game.clock_interval is invalid")?;
        if !(0.0..=1.0).contains(&self.game.event_probability) {
            bail!("game.event_probability must be within [0, 1]");
        }
        if self.game.initial_price < self.game.price_floor {
            bail!("game.initial_price must be >= game.price_floor");
        }
        if self.leaderboard.capacity == 0 {
            bail!("leaderboard.capacity must be > 0");
        }
        if self.analytics.short_ma_period == 0
            || self.analytics.long_ma_period == 0
            || self.analytics.band_period == 0
            || self.analytics.trend_period == 0
        {
            bail!("analytics periods must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_valid() {
        assert_eq!(parse_interval_ms("600ms").unwrap(), 600);
        assert_eq!(parse_interval_ms("1s").unwrap(), 1_000);
        assert_eq!(parse_interval_ms("2m").unwrap(), 120_000);
    }

    #[test]
    fn parse_interval_rejects_invalid_inputs() {
        assert!(parse_interval_ms("").is_err());
        assert!(parse_interval_ms("ms").is_err());
        assert!(parse_interval_ms("0s").is_err());
        assert!(parse_interval_ms("1h").is_err());
        assert!(parse_interval_ms("-1s").is_err());
    }

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_trend_strength_outside_unit_interval() {
        let mut config = Config::default();
        config.difficulty.hard.trend_strength = 1.5;
        assert!(config.validate().is_err());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::FinalScore;
use crate::model::difficulty::Difficulty;

pub const LEADERBOARD_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i64,
    #[serde(with = "profit_rate_format")]
    pub profit_rate: f64,
    pub difficulty: Difficulty,
    pub time: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn from_score(name: &str, score: &FinalScore, time: DateTime<Utc>) -> Self {
        Self {
            name: name.trim().to_string(),
            score: i64::try_from(score.total_assets).unwrap_or(i64::MAX),
            profit_rate: score.profit_rate,
            difficulty: score.difficulty,
            time,
        }
    }
}

/// Profit rate is stored as a two-decimal string ("12.34"); older exports and
/// hand-edited files may carry a bare number, so both are accepted on read.
mod profit_rate_format {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.2}", value))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid profit rate '{}'", s)))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(de::Error::custom("profit rate must be finite"))
        }
    }
}

/// Top-N scores, sorted descending. Ties keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    capacity: usize,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(LEADERBOARD_CAPACITY)
    }
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn from_entries(entries: Vec<LeaderboardEntry>, capacity: usize) -> Self {
        let mut board = Self::new(capacity);
        board.entries = entries;
        board.normalize();
        board
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts and returns the zero-based rank, or `None` if the entry did not
    /// make the cut.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        self.entries.push(entry);
        let inserted = self.entries.len() - 1;
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| self.entries[b].score.cmp(&self.entries[a].score));
        let rank = order.iter().position(|&i| i == inserted);
        self.normalize();
        rank.filter(|&r| r < self.capacity)
    }

    pub fn remove(&mut self, index: usize) -> Result<LeaderboardEntry, GameError> {
        if index >= self.entries.len() {
            return Err(GameError::RecordIndex(index + 1));
        }
        Ok(self.entries.remove(index))
    }

    /// Would `score` make it onto the board right now?
    pub fn qualifies(&self, score: i64) -> bool {
        self.entries.len() < self.capacity
            || self.entries.last().is_some_and(|last| score > last.score)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Replaces all entries with the array in `payload`. On any error the
    /// board is left untouched.
    pub fn import_json(&mut self, payload: &str) -> Result<usize, GameError> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| GameError::Import(e.to_string()))?;
        if !value.is_array() {
            return Err(GameError::ImportNotArray);
        }
        let entries: Vec<LeaderboardEntry> =
            serde_json::from_value(value).map_err(|e| GameError::Import(e.to_string()))?;
        let imported = entries.len();
        self.entries = entries;
        self.normalize();
        Ok(imported)
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);
    }
}

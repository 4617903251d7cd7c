use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::progress::AchievementBook;

pub const SCORES_KEY: &str = "stockGameScores";
pub const ACHIEVEMENTS_KEY: &str = "stockGameAchievements";

/// Small string key/value cache on SQLite. Values are JSON documents.
pub struct ScoreStore {
    conn: Connection,
}

impl ScoreStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open score store {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_cache WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            r#"
            INSERT INTO kv_cache (key, value, updated_at_ms) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at_ms = excluded.updated_at_ms
            "#,
            params![key, value, now_ms],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_cache WHERE key = ?1", [key])?;
        Ok(())
    }

    /// A missing or unreadable cache yields an empty board.
    pub fn load_leaderboard(&self, capacity: usize) -> Result<Leaderboard> {
        let Some(raw) = self.get(SCORES_KEY)? else {
            return Ok(Leaderboard::new(capacity));
        };
        match serde_json::from_str::<Vec<LeaderboardEntry>>(&raw) {
            Ok(entries) => Ok(Leaderboard::from_entries(entries, capacity)),
            Err(e) => {
                tracing::warn!(key = SCORES_KEY, error = %e, "corrupt leaderboard cache, starting empty");
                Ok(Leaderboard::new(capacity))
            }
        }
    }

    pub fn save_leaderboard(&self, board: &Leaderboard) -> Result<()> {
        let json = serde_json::to_string(board.entries())?;
        self.put(SCORES_KEY, &json)
    }

    pub fn load_achievements(&self) -> Result<AchievementBook> {
        let Some(raw) = self.get(ACHIEVEMENTS_KEY)? else {
            return Ok(AchievementBook::default());
        };
        match serde_json::from_str(&raw) {
            Ok(book) => Ok(book),
            Err(e) => {
                tracing::warn!(key = ACHIEVEMENTS_KEY, error = %e, "corrupt achievement cache, starting empty");
                Ok(AchievementBook::default())
            }
        }
    }

    pub fn save_achievements(&self, book: &AchievementBook) -> Result<()> {
        let json = serde_json::to_string(book)?;
        self.put(ACHIEVEMENTS_KEY, &json)
    }

    pub fn clear_achievements(&self) -> Result<()> {
        self.remove(ACHIEVEMENTS_KEY)
    }
}

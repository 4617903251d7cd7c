use thiserror::Error;

use crate::modifier::ItemKind;

/// Rejections surfaced to the player. Every variant leaves game state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("game is not running")]
    NotRunning,

    #[error("game is already running")]
    AlreadyRunning,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("insufficient shares: requested {requested}, holding {held}")]
    InsufficientShares { requested: u64, held: u64 },

    #[error("{0} is already active")]
    ItemActive(ItemKind),

    #[error("{0} was already used this game")]
    ItemUsed(ItemKind),

    #[error("leaderboard import failed: {0}")]
    Import(String),

    #[error("leaderboard import must be a JSON array")]
    ImportNotArray,

    #[error("leaderboard export failed: {0}")]
    Export(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("no record at rank {0}")]
    RecordIndex(usize),

    #[error("incorrect admin credential")]
    AdminDenied,
}

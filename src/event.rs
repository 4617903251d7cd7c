use std::fmt;

use crate::error::GameError;
use crate::game::FinalScore;
use crate::market::events::EventOutcome;
use crate::modifier::ItemKind;
use crate::progress::{Achievement, Quest};

/// Something the player should be told about, rendered into the UI log.
#[derive(Debug, Clone, PartialEq)]
pub enum GameNotice {
    GameStarted { difficulty: String },
    MarketEvent(EventOutcome),
    ItemActivated { kind: ItemKind, duration_secs: u64 },
    ItemExpired(ItemKind),
    AchievementUnlocked(Achievement),
    QuestCompleted { quest: Quest, reward: u64 },
    Rejected(GameError),
    GameOver(FinalScore),
}

impl fmt::Display for GameNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameStarted { difficulty } => write!(f, "Game started ({})", difficulty),
            Self::MarketEvent(outcome) => f.write_str(&outcome.message),
            Self::ItemActivated {
                kind,
                duration_secs,
            } => write!(f, "{} active for {}s", kind, duration_secs),
            Self::ItemExpired(kind) => write!(f, "{} wore off", kind),
            Self::AchievementUnlocked(a) => {
                write!(f, "Achievement unlocked: {} ({})", a, a.description())
            }
            Self::QuestCompleted { quest, reward } => {
                write!(f, "Quest complete: {} (+{})", quest.description(), reward)
            }
            Self::Rejected(err) => write!(f, "Rejected: {}", err),
            Self::GameOver(score) => write!(
                f,
                "Game over: total assets {} ({:.2}%)",
                score.total_assets, score.profit_rate
            ),
        }
    }
}

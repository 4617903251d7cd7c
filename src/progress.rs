use std::fmt;

use serde::{Deserialize, Serialize};

const PROFIT_KING_RATE: f64 = 100.0;
const TYCOON_ASSETS: u64 = 100_000_000;
const WIN_STREAK_TARGET: u32 = 5;
const RISK_TAKER_RATIO: f64 = 0.95;

/// Inputs the progress trackers look at, captured after each tick or trade.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressSnapshot {
    pub trade_count: u32,
    pub profit_rate: f64,
    pub total_assets: u64,
    pub holdings_value: u64,
    pub cash: u64,
    pub win_streak: u32,
    pub items_used: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstTrade,
    ProfitKing,
    Tycoon,
    WinningStreak,
    RiskTaker,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::FirstTrade,
        Achievement::ProfitKing,
        Achievement::Tycoon,
        Achievement::WinningStreak,
        Achievement::RiskTaker,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::FirstTrade => "Rookie Investor",
            Self::ProfitKing => "Profit King",
            Self::Tycoon => "Tycoon",
            Self::WinningStreak => "Hot Streak",
            Self::RiskTaker => "Risk Taker",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FirstTrade => "Complete your first trade",
            Self::ProfitKing => "Reach a 100% profit rate",
            Self::Tycoon => "Hold 100,000,000 in total assets",
            Self::WinningStreak => "Close 5 profitable sells in a row",
            Self::RiskTaker => "Put nearly everything into the stock at once",
        }
    }

    fn is_met(self, s: &ProgressSnapshot) -> bool {
        match self {
            Self::FirstTrade => s.trade_count > 0,
            Self::ProfitKing => s.profit_rate >= PROFIT_KING_RATE,
            Self::Tycoon => s.total_assets >= TYCOON_ASSETS,
            Self::WinningStreak => s.win_streak >= WIN_STREAK_TARGET,
            Self::RiskTaker => {
                s.holdings_value > 0 && s.holdings_value as f64 >= s.cash as f64 * RISK_TAKER_RATIO
            }
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementBook {
    unlocked: Vec<Achievement>,
}

impl AchievementBook {
    /// Unlocks everything newly satisfied and returns it in declaration order.
    pub fn evaluate(&mut self, snapshot: &ProgressSnapshot) -> Vec<Achievement> {
        let mut fresh = Vec::new();
        for a in Achievement::ALL {
            if !self.is_unlocked(a) && a.is_met(snapshot) {
                self.unlocked.push(a);
                fresh.push(a);
            }
        }
        fresh
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }

    pub fn clear(&mut self) {
        self.unlocked.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quest {
    TenTrades,
    HalfProfit,
    ThreeItems,
}

impl Quest {
    pub const ALL: [Quest; 3] = [Quest::TenTrades, Quest::HalfProfit, Quest::ThreeItems];

    pub fn description(self) -> &'static str {
        match self {
            Self::TenTrades => "Make 10 trades",
            Self::HalfProfit => "Reach a 50% profit rate",
            Self::ThreeItems => "Use 3 items",
        }
    }

    pub fn target(self) -> f64 {
        match self {
            Self::TenTrades => 10.0,
            Self::HalfProfit => 50.0,
            Self::ThreeItems => 3.0,
        }
    }

    pub fn reward(self) -> u64 {
        match self {
            Self::TenTrades => 100_000,
            Self::HalfProfit => 200_000,
            Self::ThreeItems => 50_000,
        }
    }

    fn measure(self, s: &ProgressSnapshot) -> f64 {
        match self {
            Self::TenTrades => s.trade_count as f64,
            Self::HalfProfit => s.profit_rate,
            Self::ThreeItems => s.items_used as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestProgress {
    pub quest: Quest,
    pub current: f64,
    pub completed: bool,
}

impl QuestProgress {
    /// Progress toward the target, clamped to `[0, 100]`.
    pub fn percent(&self) -> f64 {
        (self.current / self.quest.target() * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestBoard {
    quests: Vec<QuestProgress>,
}

impl Default for QuestBoard {
    fn default() -> Self {
        Self {
            quests: Quest::ALL
                .iter()
                .map(|&quest| QuestProgress {
                    quest,
                    current: 0.0,
                    completed: false,
                })
                .collect(),
        }
    }
}

impl QuestBoard {
    /// Updates progress and returns quests completed by this update. Each
    /// quest completes at most once.
    pub fn update(&mut self, snapshot: &ProgressSnapshot) -> Vec<Quest> {
        let mut completed = Vec::new();
        for q in &mut self.quests {
            q.current = q.quest.measure(snapshot);
            if !q.completed && q.current >= q.quest.target() {
                q.completed = true;
                completed.push(q.quest);
            }
        }
        completed
    }

    pub fn quests(&self) -> &[QuestProgress] {
        &self.quests
    }
}

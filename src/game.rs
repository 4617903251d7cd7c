use anyhow::Result;
use rand::Rng;
use uuid::Uuid;

use crate::config::{Config, DifficultyProfile};
use crate::error::GameError;
use crate::event::GameNotice;
use crate::market::events::{EventOutcome, MarketEvent};
use crate::market::price_model::{next_price, PriceParams, TrendState};
use crate::model::difficulty::Difficulty;
use crate::model::portfolio::{Portfolio, TradeFill};
use crate::model::price_series::PriceSeries;
use crate::modifier::{ItemCatalog, ItemKind, ItemPolicy, Modifier, ModifierBook, ModifierEffect};
use crate::progress::{Achievement, AchievementBook, ProgressSnapshot, Quest, QuestBoard};

const FALLBACK_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedProfile {
    pub volatility: f64,
    pub trend_strength: f64,
    pub tick_interval_ms: u64,
}

impl From<&DifficultyProfile> for ResolvedProfile {
    fn from(p: &DifficultyProfile) -> Self {
        Self {
            volatility: p.volatility,
            trend_strength: p.trend_strength,
            tick_interval_ms: p.tick_interval_ms().unwrap_or(FALLBACK_INTERVAL_MS),
        }
    }
}

/// Everything a game needs from configuration, with intervals already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
    pub initial_cash: u64,
    pub initial_price: u64,
    pub duration_secs: u64,
    pub price_floor: u64,
    pub history_len: usize,
    pub event_probability: f64,
    pub event_log_len: usize,
    pub clock_interval_ms: u64,
    pub easy: ResolvedProfile,
    pub normal: ResolvedProfile,
    pub hard: ResolvedProfile,
    pub item_policy: ItemPolicy,
    pub items: ItemCatalog,
}

impl GameSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::resolve(config))
    }

    fn resolve(config: &Config) -> Self {
        let game = &config.game;
        Self {
            initial_cash: game.initial_cash,
            initial_price: game.initial_price.max(game.price_floor),
            duration_secs: game.duration_secs,
            price_floor: game.price_floor,
            history_len: game.history_len,
            event_probability: game.event_probability,
            event_log_len: game.event_log_len,
            clock_interval_ms: crate::config::parse_interval_ms(&game.clock_interval)
                .unwrap_or(FALLBACK_INTERVAL_MS),
            easy: (&config.difficulty.easy).into(),
            normal: (&config.difficulty.normal).into(),
            hard: (&config.difficulty.hard).into(),
            item_policy: config.items.policy,
            items: config.items.catalog,
        }
    }

    pub fn profile(&self, difficulty: Difficulty) -> &ResolvedProfile {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::resolve(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ready,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalScore {
    pub total_assets: u64,
    /// Percent, rounded to two decimals.
    pub profit_rate: f64,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub price: u64,
    pub market_event: Option<EventOutcome>,
    pub expired: Vec<ItemKind>,
    pub achievements: Vec<Achievement>,
    pub quests: Vec<Quest>,
}

impl TickReport {
    pub fn notices(&self) -> Vec<GameNotice> {
        let mut out: Vec<GameNotice> = self.expired.iter().map(|&k| GameNotice::ItemExpired(k)).collect();
        if let Some(outcome) = &self.market_event {
            out.push(GameNotice::MarketEvent(outcome.clone()));
        }
        out.extend(self.achievements.iter().map(|&a| GameNotice::AchievementUnlocked(a)));
        out.extend(self.quests.iter().map(|&quest| GameNotice::QuestCompleted {
            quest,
            reward: quest.reward(),
        }));
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClockReport {
    pub time_left_secs: u64,
    pub frozen: bool,
    pub expired: Vec<ItemKind>,
    pub finished: Option<FinalScore>,
}

impl ClockReport {
    pub fn notices(&self) -> Vec<GameNotice> {
        let mut out: Vec<GameNotice> = self.expired.iter().map(|&k| GameNotice::ItemExpired(k)).collect();
        if let Some(score) = self.finished {
            out.push(GameNotice::GameOver(score));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeReport {
    pub fill: TradeFill,
    pub achievements: Vec<Achievement>,
}

/// The whole game. Mutated only by the scheduler handlers and player actions,
/// each of which runs to completion before the next.
#[derive(Debug, Clone)]
pub struct GameState {
    settings: GameSettings,
    session_id: Uuid,
    difficulty: Difficulty,
    status: GameStatus,
    portfolio: Portfolio,
    series: PriceSeries,
    trend: TrendState,
    time_left_secs: u64,
    modifiers: ModifierBook,
    achievements: AchievementBook,
    quests: QuestBoard,
    event_log: Vec<String>,
}

impl GameState {
    pub fn new(settings: GameSettings, difficulty: Difficulty) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            difficulty,
            status: GameStatus::Ready,
            portfolio: Portfolio::new(settings.initial_cash),
            series: PriceSeries::new(settings.initial_price, settings.history_len),
            trend: TrendState::default(),
            time_left_secs: settings.duration_secs,
            modifiers: ModifierBook::new(settings.item_policy),
            achievements: AchievementBook::default(),
            quests: QuestBoard::default(),
            event_log: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn current_price(&self) -> u64 {
        self.series.current()
    }

    pub fn trend(&self) -> TrendState {
        self.trend
    }

    pub fn time_left_secs(&self) -> u64 {
        self.time_left_secs
    }

    pub fn modifiers(&self) -> &ModifierBook {
        &self.modifiers
    }

    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    pub fn quests(&self) -> &QuestBoard {
        &self.quests
    }

    /// Newest first.
    pub fn event_log(&self) -> &[String] {
        &self.event_log
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.settings.profile(self.difficulty).tick_interval_ms
    }

    pub fn clock_interval_ms(&self) -> u64 {
        self.settings.clock_interval_ms
    }

    pub fn price_params(&self) -> PriceParams {
        let profile = self.settings.profile(self.difficulty);
        PriceParams {
            volatility: profile.volatility,
            trend_strength: profile.trend_strength,
            floor: self.settings.price_floor,
        }
    }

    pub fn total_assets(&self) -> u64 {
        self.portfolio.total_assets(self.current_price())
    }

    pub fn profit_rate(&self) -> f64 {
        self.portfolio
            .profit_rate(self.current_price(), self.settings.initial_cash)
    }

    pub fn final_score(&self) -> FinalScore {
        FinalScore {
            total_assets: self.total_assets(),
            profit_rate: (self.profit_rate() * 100.0).round() / 100.0,
            difficulty: self.difficulty,
        }
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        if self.is_running() {
            return Err(GameError::AlreadyRunning);
        }
        self.difficulty = difficulty;
        Ok(())
    }

    pub fn reset(&mut self) {
        let settings = self.settings.clone();
        *self = Self::new(settings, self.difficulty);
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        if self.is_running() {
            return Err(GameError::AlreadyRunning);
        }
        self.reset();
        self.status = GameStatus::Running;
        tracing::info!(
            session = %self.session_id,
            difficulty = %self.difficulty,
            tick_interval_ms = self.tick_interval_ms(),
            "game started"
        );
        Ok(())
    }

    /// Stops the game and returns its score. Idempotent.
    pub fn finish(&mut self) -> FinalScore {
        let score = self.final_score();
        if self.status == GameStatus::Running {
            self.status = GameStatus::Finished;
            tracing::info!(
                session = %self.session_id,
                total_assets = score.total_assets,
                profit_rate = score.profit_rate,
                "game finished"
            );
        }
        score
    }

    pub fn buy(&mut self, qty: u64) -> Result<TradeReport, GameError> {
        self.ensure_running()?;
        let fill = self.portfolio.buy(qty, self.current_price())?;
        tracing::debug!(session = %self.session_id, qty, price = fill.price, "buy filled");
        Ok(self.trade_report(fill))
    }

    pub fn sell(&mut self, qty: u64) -> Result<TradeReport, GameError> {
        self.ensure_running()?;
        let fill = self.portfolio.sell(qty, self.current_price())?;
        tracing::debug!(
            session = %self.session_id,
            qty,
            price = fill.price,
            pnl = fill.realized_pnl.unwrap_or_default(),
            "sell filled"
        );
        Ok(self.trade_report(fill))
    }

    pub fn purchase_item(&mut self, kind: ItemKind, now_ms: u64) -> Result<Modifier, GameError> {
        self.ensure_running()?;
        self.modifiers.can_purchase(kind)?;
        let spec = self.settings.items.spec(kind);
        self.portfolio.debit(spec.price)?;

        let effect = ModifierEffect::for_kind(kind, self.current_price());
        let modifier = self
            .modifiers
            .activate(effect, now_ms, spec.duration_secs.saturating_mul(1_000));
        let message = match effect {
            ModifierEffect::TimeFreeze => format!("Clock frozen for {}s", spec.duration_secs),
            ModifierEffect::PricePeg { fixed_price } => {
                format!("Price pegged at {} for {}s", fixed_price, spec.duration_secs)
            }
            ModifierEffect::DoubleGain { .. } => format!(
                "Double gain on: gains x2, losses x0.5 for {}s",
                spec.duration_secs
            ),
        };
        self.log_event(message);
        tracing::info!(session = %self.session_id, item = ?kind, now_ms, "item activated");
        Ok(modifier)
    }

    /// Price timer handler. Returns `None` when the game is not running.
    pub fn on_price_tick<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) -> Option<TickReport> {
        if !self.is_running() {
            return None;
        }
        let expired = self.expire_modifiers(now_ms);
        let effects = self.modifiers.price_effects();

        let mut base = self.current_price();
        let mut market_event = None;
        if effects.pegged_price.is_none() {
            if let Some(event) = MarketEvent::roll(self.settings.event_probability, rng) {
                let outcome = event.apply(base, &mut self.portfolio);
                tracing::info!(session = %self.session_id, event = %event, price = outcome.price, "market event");
                self.log_event(outcome.message.clone());
                base = outcome.price;
                market_event = Some(outcome);
            }
        }

        let step = next_price(base, self.trend, &self.price_params(), &effects, rng);
        self.trend = step.trend;
        self.series.push(step.price);

        let snapshot = self.snapshot();
        let achievements = self.unlock_achievements(&snapshot);
        let quests = self.quests.update(&snapshot);
        for quest in &quests {
            self.portfolio.credit(quest.reward());
            self.log_event(format!(
                "Quest complete: {} (+{})",
                quest.description(),
                quest.reward()
            ));
        }

        Some(TickReport {
            price: step.price,
            market_event,
            expired,
            achievements,
            quests,
        })
    }

    /// Countdown timer handler. Returns `None` when the game is not running.
    pub fn on_clock_tick(&mut self, now_ms: u64) -> Option<ClockReport> {
        if !self.is_running() {
            return None;
        }
        let expired = self.expire_modifiers(now_ms);
        let frozen = self.modifiers.is_clock_frozen();
        if !frozen {
            self.time_left_secs = self.time_left_secs.saturating_sub(1);
        }
        let finished = (self.time_left_secs == 0).then(|| self.finish());
        Some(ClockReport {
            time_left_secs: self.time_left_secs,
            frozen,
            expired,
            finished,
        })
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let price = self.current_price();
        ProgressSnapshot {
            trade_count: self.portfolio.trade_count,
            profit_rate: self.profit_rate(),
            total_assets: self.portfolio.total_assets(price),
            holdings_value: self.portfolio.holdings_value(price),
            cash: self.portfolio.cash,
            win_streak: self.portfolio.win_streak,
            items_used: self.modifiers.purchases(),
        }
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(GameError::NotRunning)
        }
    }

    fn trade_report(&mut self, fill: TradeFill) -> TradeReport {
        let snapshot = self.snapshot();
        let achievements = self.unlock_achievements(&snapshot);
        TradeReport { fill, achievements }
    }

    fn unlock_achievements(&mut self, snapshot: &ProgressSnapshot) -> Vec<Achievement> {
        let fresh = self.achievements.evaluate(snapshot);
        for a in &fresh {
            tracing::info!(session = %self.session_id, achievement = ?a, "achievement unlocked");
            self.log_event(format!("Achievement unlocked: {}", a));
        }
        fresh
    }

    fn expire_modifiers(&mut self, now_ms: u64) -> Vec<ItemKind> {
        let expired = self.modifiers.expire(now_ms);
        for kind in &expired {
            self.log_event(format!("{} wore off", kind));
        }
        expired
    }

    fn log_event(&mut self, message: String) {
        self.event_log.insert(0, message);
        self.event_log.truncate(self.settings.event_log_len);
    }
}

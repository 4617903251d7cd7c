pub mod chart;
pub mod dashboard;

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};
use ratatui::Frame;

use crate::event::GameNotice;
use crate::game::{FinalScore, GameState, GameStatus};
use crate::indicator::overlay::{AnalyticsConfig, ChartOverlay};
use crate::input::{NameEntryCommand, UiCommand};
use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::scheduler::Fired;

use chart::PriceChart;
use dashboard::{
    AccountPanel, GameOverPopup, ItemPanel, KeybindBar, LeaderboardPanel, LogPanel, ProgressPanel,
    StatusBar,
};

const MAX_LOG_MESSAGES: usize = 200;
const MAX_NAME_CHARS: usize = crate::admin::MAX_NAME_CHARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
    Leaderboard,
}

/// What the event loop has to do after the UI state handled input.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    None,
    Quit,
    GameStarted,
    GameReset,
    AchievementsChanged,
    ScoreSubmitted(LeaderboardEntry),
}

pub struct AppState {
    pub game: GameState,
    pub leaderboard: Leaderboard,
    pub analytics: AnalyticsConfig,
    pub overlay: ChartOverlay,
    pub quantity: u64,
    pub screen: Screen,
    pub name_input: String,
    pub pending_score: Option<FinalScore>,
    pub log_messages: Vec<String>,
    /// Milliseconds since the current game started.
    pub now_ms: u64,
}

impl AppState {
    pub fn new(
        game: GameState,
        leaderboard: Leaderboard,
        analytics: AnalyticsConfig,
        default_quantity: u64,
    ) -> Self {
        let overlay = ChartOverlay::compute(game.series().as_slice(), &analytics);
        Self {
            game,
            leaderboard,
            analytics,
            overlay,
            quantity: default_quantity.max(1),
            screen: Screen::Playing,
            name_input: String::new(),
            pending_score: None,
            log_messages: Vec::new(),
            now_ms: 0,
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    pub fn push_notices(&mut self, notices: impl IntoIterator<Item = GameNotice>) {
        for notice in notices {
            self.push_log(notice.to_string());
        }
    }

    pub fn refresh_overlay(&mut self) {
        self.overlay = ChartOverlay::compute(self.game.series().as_slice(), &self.analytics);
    }

    /// Folds scheduler output into the UI. Returns true when new achievements
    /// were unlocked and need persisting.
    pub fn apply_fired(&mut self, fired: &Fired) -> bool {
        match fired {
            Fired::Price(report) => {
                self.push_notices(report.notices());
                self.refresh_overlay();
                !report.achievements.is_empty()
            }
            Fired::Clock(report) => {
                self.push_notices(report.notices());
                if let Some(score) = report.finished {
                    self.on_game_over(score);
                }
                false
            }
        }
    }

    fn on_game_over(&mut self, score: FinalScore) {
        self.pending_score = Some(score);
        self.name_input.clear();
        self.screen = Screen::GameOver;
    }

    pub fn score_qualifies(&self) -> bool {
        self.pending_score
            .is_some_and(|s| self.leaderboard.qualifies(i64::try_from(s.total_assets).unwrap_or(i64::MAX)))
    }

    pub fn handle_command(&mut self, cmd: UiCommand) -> UiAction {
        match cmd {
            UiCommand::Quit => return UiAction::Quit,
            UiCommand::ToggleLeaderboard => {
                self.screen = match self.screen {
                    Screen::Leaderboard => Screen::Playing,
                    _ => Screen::Leaderboard,
                };
            }
            UiCommand::IncreaseQty(n) => self.quantity = self.quantity.saturating_add(n),
            UiCommand::DecreaseQty(n) => self.quantity = self.quantity.saturating_sub(n).max(1),
            UiCommand::StartGame => match self.game.start() {
                Ok(()) => {
                    self.now_ms = 0;
                    self.screen = Screen::Playing;
                    self.refresh_overlay();
                    self.push_notices([GameNotice::GameStarted {
                        difficulty: self.game.difficulty().to_string(),
                    }]);
                    return UiAction::GameStarted;
                }
                Err(e) => self.push_notices([GameNotice::Rejected(e)]),
            },
            UiCommand::Reset => {
                if self.game.is_running() {
                    self.game.finish();
                }
                self.game.reset();
                self.now_ms = 0;
                self.pending_score = None;
                self.screen = Screen::Playing;
                self.refresh_overlay();
                self.push_log("Game reset".to_string());
                return UiAction::GameReset;
            }
            UiCommand::CycleDifficulty => {
                let next = self.game.difficulty().next();
                match self.game.set_difficulty(next) {
                    Ok(()) => self.push_log(format!("Difficulty: {}", next)),
                    Err(e) => self.push_notices([GameNotice::Rejected(e)]),
                }
            }
            UiCommand::Buy => match self.game.buy(self.quantity) {
                Ok(report) => {
                    self.push_log(format!(
                        "Bought {} @ {}",
                        report.fill.qty,
                        dashboard::format_amount(report.fill.price)
                    ));
                    return self.after_unlocks(&report.achievements);
                }
                Err(e) => self.push_notices([GameNotice::Rejected(e)]),
            },
            UiCommand::Sell => match self.game.sell(self.quantity) {
                Ok(report) => {
                    self.push_log(format!(
                        "Sold {} @ {} (P&L {:+.0})",
                        report.fill.qty,
                        dashboard::format_amount(report.fill.price),
                        report.fill.realized_pnl.unwrap_or_default()
                    ));
                    return self.after_unlocks(&report.achievements);
                }
                Err(e) => self.push_notices([GameNotice::Rejected(e)]),
            },
            UiCommand::UseItem(kind) => match self.game.purchase_item(kind, self.now_ms) {
                Ok(modifier) => self.push_notices([GameNotice::ItemActivated {
                    kind,
                    duration_secs: modifier.duration_ms / 1_000,
                }]),
                Err(e) => self.push_notices([GameNotice::Rejected(e)]),
            },
        }
        UiAction::None
    }

    fn after_unlocks(&mut self, unlocked: &[crate::progress::Achievement]) -> UiAction {
        if unlocked.is_empty() {
            return UiAction::None;
        }
        self.push_notices(unlocked.iter().map(|&a| GameNotice::AchievementUnlocked(a)));
        UiAction::AchievementsChanged
    }

    pub fn handle_name_entry(&mut self, cmd: NameEntryCommand, now: DateTime<Utc>) -> UiAction {
        match cmd {
            NameEntryCommand::Push(c) => {
                if self.name_input.chars().count() < MAX_NAME_CHARS {
                    self.name_input.push(c);
                }
            }
            NameEntryCommand::Backspace => {
                self.name_input.pop();
            }
            NameEntryCommand::Cancel => {
                self.pending_score = None;
                self.screen = Screen::Playing;
            }
            NameEntryCommand::Submit => {
                let name = self.name_input.trim();
                if name.is_empty() || !self.score_qualifies() {
                    return UiAction::None;
                }
                let Some(score) = self.pending_score.take() else {
                    return UiAction::None;
                };
                let entry = LeaderboardEntry::from_score(name, &score, now);
                match self.leaderboard.insert(entry.clone()) {
                    Some(rank) => self.push_log(format!("Saved as #{} {}", rank + 1, entry.name)),
                    None => self.push_log("Score did not make the leaderboard".to_string()),
                }
                self.screen = Screen::Leaderboard;
                return UiAction::ScoreSubmitted(entry);
            }
        }
        UiAction::None
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn chart_title(state: &AppState) -> String {
    let fmt = |v: Option<u64>| v.map_or_else(|| "---".to_string(), dashboard::format_amount);
    let cfg = &state.analytics;
    let band = state.overlay.latest_band().map_or_else(
        || "---".to_string(),
        |b| {
            format!(
                "{}-{}",
                dashboard::format_amount(b.lower.max(0) as u64),
                dashboard::format_amount(b.upper.max(0) as u64)
            )
        },
    );
    format!(
        " Price ({}) | MA{} {} | MA{} {} | BB {} | next {} ",
        state.game.difficulty(),
        cfg.short_ma_period,
        fmt(state.overlay.latest_short_ma()),
        cfg.long_ma_period,
        fmt(state.overlay.latest_long_ma()),
        band,
        fmt(state.overlay.latest_trend()),
    )
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(12),   // chart + side panels
            Constraint::Length(7), // event + system logs
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    frame.render_widget(StatusBar { game: &state.game }, outer[0]);

    let main_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(34)])
        .split(outer[1]);

    let title = chart_title(state);
    frame.render_widget(
        PriceChart::new(state.game.series().as_slice())
            .overlay(&state.overlay)
            .title(&title),
        main_area[0],
    );

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Min(6),
        ])
        .split(main_area[1]);
    frame.render_widget(AccountPanel::new(&state.game, state.quantity), side[0]);
    frame.render_widget(ItemPanel::new(&state.game, state.now_ms), side[1]);
    frame.render_widget(
        ProgressPanel::new(state.game.quests().quests(), state.game.achievements().unlocked()),
        side[2],
    );

    let logs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(outer[2]);
    frame.render_widget(LogPanel::events(state.game.event_log()), logs[0]);
    frame.render_widget(LogPanel::system(&state.log_messages), logs[1]);

    frame.render_widget(KeybindBar, outer[3]);

    match state.screen {
        Screen::Playing => {}
        Screen::Leaderboard => {
            let height = state.leaderboard.capacity() as u16 + 4;
            frame.render_widget(
                LeaderboardPanel::new(state.leaderboard.entries()),
                centered(frame.area(), 64, height),
            );
        }
        Screen::GameOver => {
            if let Some(score) = state.pending_score.as_ref() {
                frame.render_widget(
                    GameOverPopup::new(score, &state.name_input, state.score_qualifies()),
                    centered(frame.area(), 40, 7),
                );
            }
        }
    }

    if state.game.status() == GameStatus::Ready && state.screen == Screen::Playing {
        let hint = centered(main_area[0], 28, 1);
        frame
            .buffer_mut()
            .set_string(hint.x, hint.y, " press [Enter] to start ", ratatui::style::Style::default());
    }
}

use chrono::Utc;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use rand::rngs::StdRng;
use rand::SeedableRng;

use stock_rush::game::{GameSettings, GameState};
use stock_rush::indicator::overlay::AnalyticsConfig;
use stock_rush::input::{NameEntryCommand, UiCommand};
use stock_rush::leaderboard::Leaderboard;
use stock_rush::model::difficulty::Difficulty;
use stock_rush::modifier::ItemKind;
use stock_rush::scheduler::{self, Scheduler};
use stock_rush::ui::{self, AppState, Screen, UiAction};

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn app(settings: GameSettings) -> AppState {
    AppState::new(
        GameState::new(settings, Difficulty::Easy),
        Leaderboard::default(),
        AnalyticsConfig::default(),
        1,
    )
}

fn draw(state: &AppState) -> String {
    let backend = TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend).expect("test terminal");
    terminal
        .draw(|frame| ui::render(frame, state))
        .expect("render should succeed");
    buffer_text(&terminal)
}

#[test]
fn renders_dashboard_panels_before_start() {
    let state = app(GameSettings::default());
    let text = draw(&state);
    assert!(text.contains("Account"));
    assert!(text.contains("Items"));
    assert!(text.contains("1,000,000"));
    assert!(text.contains("READY"));
    assert!(text.contains("press [Enter] to start"));
}

#[test]
fn buy_updates_account_panel_and_log() {
    let mut state = app(GameSettings::default());
    assert_eq!(state.handle_command(UiCommand::StartGame), UiAction::GameStarted);
    for _ in 0..4 {
        state.handle_command(UiCommand::IncreaseQty(1));
    }
    assert_eq!(state.quantity, 5);
    assert_eq!(state.handle_command(UiCommand::Buy), UiAction::AchievementsChanged);

    let text = draw(&state);
    assert!(text.contains("750,000"));
    assert!(text.contains("Bought 5 @ 50,000"));
    assert!(text.contains("RUNNING"));
}

#[test]
fn item_panel_shows_double_gain_move() {
    let mut state = app(GameSettings::default());
    state.handle_command(UiCommand::StartGame);
    state.handle_command(UiCommand::UseItem(ItemKind::DoubleGain));
    assert!(state.game.modifiers().is_active(ItemKind::DoubleGain));

    let text = draw(&state);
    assert!(text.contains("ON 15s +0.0%"));
}

#[test]
fn rejected_trade_is_logged_not_applied() {
    let mut state = app(GameSettings::default());
    state.handle_command(UiCommand::StartGame);
    assert_eq!(state.handle_command(UiCommand::Sell), UiAction::None);
    assert!(state
        .log_messages
        .last()
        .is_some_and(|m| m.starts_with("Rejected")));
    assert_eq!(state.game.portfolio().cash, 1_000_000);
}

#[test]
fn quantity_never_drops_below_one() {
    let mut state = app(GameSettings::default());
    state.handle_command(UiCommand::DecreaseQty(10));
    assert_eq!(state.quantity, 1);
    state.handle_command(UiCommand::IncreaseQty(10));
    assert_eq!(state.quantity, 11);
}

#[test]
fn difficulty_cycles_only_while_idle() {
    let mut state = app(GameSettings::default());
    state.handle_command(UiCommand::CycleDifficulty);
    assert_eq!(state.game.difficulty(), Difficulty::Normal);
    state.handle_command(UiCommand::StartGame);
    state.handle_command(UiCommand::CycleDifficulty);
    assert_eq!(state.game.difficulty(), Difficulty::Normal);
}

#[test]
fn game_over_popup_then_leaderboard() {
    let settings = GameSettings {
        duration_secs: 2,
        event_probability: 0.0,
        ..GameSettings::default()
    };
    let mut state = app(settings);
    state.handle_command(UiCommand::StartGame);

    let mut rng = StdRng::seed_from_u64(5);
    let mut sched = Scheduler::for_game(&state.game, 0);
    for fired in scheduler::drive(&mut state.game, &mut sched, 2_000, &mut rng) {
        state.apply_fired(&fired);
    }
    assert!(sched.is_cancelled());
    assert_eq!(state.screen, Screen::GameOver);
    assert!(draw(&state).contains("Game Over"));

    for c in "ace".chars() {
        state.handle_name_entry(NameEntryCommand::Push(c), Utc::now());
    }
    let action = state.handle_name_entry(NameEntryCommand::Submit, Utc::now());
    assert!(matches!(action, UiAction::ScoreSubmitted(ref e) if e.name == "ace"));
    assert_eq!(state.screen, Screen::Leaderboard);
    assert_eq!(state.leaderboard.len(), 1);

    let text = draw(&state);
    assert!(text.contains("Leaderboard"));
    assert!(text.contains("ace"));
}

#[test]
fn empty_name_is_not_submitted() {
    let settings = GameSettings {
        duration_secs: 1,
        event_probability: 0.0,
        ..GameSettings::default()
    };
    let mut state = app(settings);
    state.handle_command(UiCommand::StartGame);
    let mut rng = StdRng::seed_from_u64(1);
    let mut sched = Scheduler::for_game(&state.game, 0);
    for fired in scheduler::drive(&mut state.game, &mut sched, 1_000, &mut rng) {
        state.apply_fired(&fired);
    }
    assert_eq!(
        state.handle_name_entry(NameEntryCommand::Submit, Utc::now()),
        UiAction::None
    );
    assert!(state.leaderboard.is_empty());
    state.handle_name_entry(NameEntryCommand::Cancel, Utc::now());
    assert_eq!(state.screen, Screen::Playing);
    assert!(state.pending_score.is_none());
}

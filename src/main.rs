use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossterm::event::{Event, KeyEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;

use stock_rush::config::Config;
use stock_rush::game::{GameSettings, GameState};
use stock_rush::input::{parse_main_command, parse_name_entry_command};
use stock_rush::model::difficulty::Difficulty;
use stock_rush::scheduler::{self, Fired, Scheduler};
use stock_rush::score_store::ScoreStore;
use stock_rush::ui::{self, AppState, Screen, UiAction};

struct HeadlessArgs {
    difficulty: Difficulty,
    seed: Option<u64>,
}

fn parse_headless(args: &[String]) -> Result<Option<HeadlessArgs>> {
    if !args.iter().any(|a| a == "--headless") {
        return Ok(None);
    }
    let mut out = HeadlessArgs {
        difficulty: Difficulty::default(),
        seed: None,
    };
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--difficulty" => {
                let v = it.next().ok_or_else(|| anyhow!("`--difficulty` requires a value"))?;
                out.difficulty = v.parse::<Difficulty>().map_err(|e| anyhow!(e))?;
            }
            "--seed" => {
                let v = it.next().ok_or_else(|| anyhow!("`--seed` requires a value"))?;
                out.seed = Some(v.parse::<u64>().with_context(|| format!("invalid seed '{}'", v))?);
            }
            _ => {}
        }
    }
    Ok(Some(out))
}

/// Plays one game without a terminal: buy half the cash in shares on the
/// first tick, hold to the end.
fn run_headless(settings: GameSettings, args: HeadlessArgs) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = GameState::new(settings, args.difficulty);
    game.start()?;
    let mut bought = false;
    let score = scheduler::simulate(&mut game, &mut rng, |game, _, fired| {
        if bought || !matches!(fired, Fired::Price(_)) {
            return;
        }
        let qty = game.portfolio().cash / 2 / game.current_price().max(1);
        if qty > 0 && game.buy(qty).is_ok() {
            bought = true;
        }
    });
    for line in game.event_log() {
        println!("  {}", line);
    }
    println!(
        "{} | total assets {} | profit {:+.2}%",
        score.difficulty, score.total_assets, score.profit_rate
    );
    Ok(())
}

fn persist(app_state: &mut AppState, store: &ScoreStore, action: &UiAction) {
    let result = match action {
        UiAction::GameStarted | UiAction::GameReset => store.clear_achievements(),
        UiAction::AchievementsChanged => store.save_achievements(app_state.game.achievements()),
        UiAction::ScoreSubmitted(_) => store.save_leaderboard(&app_state.leaderboard),
        UiAction::None | UiAction::Quit => Ok(()),
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to persist game data");
        app_state.push_log(format!("[WARN] save failed: {}", e));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Check config/default.toml");
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("failed to create {}", config.logging.file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.logging.level)
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let settings = GameSettings::from_config(&config)?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(headless) = parse_headless(&args)? {
        return run_headless(settings, headless);
    }

    let store = ScoreStore::open(&config.leaderboard.store_path)?;
    let leaderboard = store.load_leaderboard(config.leaderboard.capacity)?;
    store.clear_achievements()?;

    tracing::info!(
        store = %config.leaderboard.store_path.display(),
        records = leaderboard.len(),
        "Starting stock-rush"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let mut terminal = ratatui::init();
    let game = GameState::new(settings, Difficulty::default());
    let mut app_state = AppState::new(
        game,
        leaderboard,
        config.analytics,
        config.ui.default_quantity,
    );
    app_state.push_log("stock-rush ready | [Enter] to start".to_string());

    let mut rng = StdRng::from_entropy();
    let mut scheduler: Option<Scheduler> = None;
    let mut game_clock = Instant::now();
    let refresh = Duration::from_millis(config.ui.refresh_rate_ms.max(1));

    let outcome: Result<()> = loop {
        if let Some(s) = scheduler.as_mut() {
            let now_ms = game_clock.elapsed().as_millis() as u64;
            app_state.now_ms = now_ms;
            let fired = scheduler::drive(&mut app_state.game, s, now_ms, &mut rng);
            for f in &fired {
                if app_state.apply_fired(f) {
                    persist(&mut app_state, &store, &UiAction::AchievementsChanged);
                }
            }
            if s.is_cancelled() {
                scheduler = None;
            }
        }

        if let Err(e) = terminal.draw(|frame| ui::render(frame, &app_state)) {
            break Err(e.into());
        }

        // Wake for whichever comes first: the next timer or a redraw.
        let timeout = scheduler
            .as_ref()
            .and_then(|s| s.next_due())
            .map(|due| {
                let now_ms = game_clock.elapsed().as_millis() as u64;
                Duration::from_millis(due.at_ms.saturating_sub(now_ms))
            })
            .map_or(refresh, |d| d.min(refresh));

        match crossterm::event::poll(timeout) {
            Ok(true) => {}
            Ok(false) => {
                if *shutdown_rx.borrow() {
                    break Ok(());
                }
                continue;
            }
            Err(e) => break Err(e.into()),
        }
        let key = match crossterm::event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
            Ok(_) => continue,
            Err(e) => break Err(e.into()),
        };

        if scheduler.is_some() {
            app_state.now_ms = game_clock.elapsed().as_millis() as u64;
        }
        let action = if app_state.screen == Screen::GameOver {
            match parse_name_entry_command(&key) {
                Some(cmd) => app_state.handle_name_entry(cmd, chrono::Utc::now()),
                None => UiAction::None,
            }
        } else {
            match parse_main_command(&key) {
                Some(cmd) => app_state.handle_command(cmd),
                None => UiAction::None,
            }
        };

        match &action {
            UiAction::Quit => {
                tracing::info!("User quit");
                break Ok(());
            }
            UiAction::GameStarted => {
                game_clock = Instant::now();
                scheduler = Some(Scheduler::for_game(&app_state.game, 0));
            }
            UiAction::GameReset => scheduler = None,
            _ => {}
        }
        persist(&mut app_state, &store, &action);

        if *shutdown_rx.borrow() {
            break Ok(());
        }
    };

    ratatui::restore();
    if app_state.game.is_running() {
        app_state.game.finish();
    }
    tracing::info!("Shutdown complete");
    println!(
        "Goodbye! Check {} for details.",
        config.logging.file.display()
    );
    outcome
}

use rand::rngs::StdRng;
use rand::SeedableRng;

use stock_rush::error::GameError;
use stock_rush::game::{GameSettings, GameState, GameStatus};
use stock_rush::model::difficulty::Difficulty;
use stock_rush::modifier::{ItemKind, ItemPolicy};
use stock_rush::progress::{Achievement, Quest};
use stock_rush::scheduler::{self, Fired};

fn quiet() -> GameSettings {
    GameSettings {
        event_probability: 0.0,
        ..GameSettings::default()
    }
}

fn running(settings: GameSettings, difficulty: Difficulty) -> GameState {
    let mut game = GameState::new(settings, difficulty);
    game.start().unwrap();
    game
}

#[test]
fn buying_five_at_fifty_thousand_leaves_750k_cash() {
    let mut game = running(quiet(), Difficulty::Easy);
    assert_eq!(game.current_price(), 50_000);
    let report = game.buy(5).unwrap();
    assert_eq!(report.fill.qty, 5);
    assert_eq!(game.portfolio().cash, 750_000);
    assert_eq!(game.portfolio().holdings, 5);
    assert_eq!(game.total_assets(), 1_000_000);
    assert_eq!(report.achievements, vec![Achievement::FirstTrade]);
}

#[test]
fn rejected_trades_leave_state_untouched() {
    let mut game = running(quiet(), Difficulty::Easy);
    assert_eq!(
        game.buy(21),
        Err(GameError::InsufficientFunds {
            needed: 1_050_000,
            available: 1_000_000
        })
    );
    assert_eq!(
        game.sell(1),
        Err(GameError::InsufficientShares {
            requested: 1,
            held: 0
        })
    );
    assert_eq!(game.buy(0), Err(GameError::InvalidQuantity));
    assert_eq!(game.portfolio().cash, 1_000_000);
    assert_eq!(game.portfolio().trade_count, 0);
}

#[test]
fn price_peg_holds_for_five_one_second_ticks() {
    let settings = GameSettings {
        initial_price: 60_000,
        ..quiet()
    };
    let mut game = running(settings, Difficulty::Easy);
    let mut rng = StdRng::seed_from_u64(11);

    game.purchase_item(ItemKind::PricePeg, 500).unwrap();
    assert_eq!(game.portfolio().cash, 1_000_000 - 30_000);

    for now_ms in (1_000..=5_000).step_by(1_000) {
        let report = game.on_price_tick(now_ms, &mut rng).unwrap();
        assert_eq!(report.price, 60_000, "tick at {}ms", now_ms);
    }

    let mut resumed = Vec::new();
    for now_ms in (6_000..=15_000).step_by(1_000) {
        let report = game.on_price_tick(now_ms, &mut rng).unwrap();
        if now_ms == 6_000 {
            assert_eq!(report.expired, vec![ItemKind::PricePeg]);
        }
        resumed.push(report.price);
    }
    assert!(resumed.iter().any(|&p| p != 60_000));
    assert!(!game.modifiers().is_active(ItemKind::PricePeg));
}

#[test]
fn single_use_items_cannot_be_bought_twice() {
    let mut game = running(quiet(), Difficulty::Easy);
    game.purchase_item(ItemKind::PricePeg, 0).unwrap();
    assert_eq!(
        game.purchase_item(ItemKind::PricePeg, 100),
        Err(GameError::ItemActive(ItemKind::PricePeg))
    );
    game.on_clock_tick(5_000).unwrap();
    assert_eq!(
        game.purchase_item(ItemKind::PricePeg, 6_000),
        Err(GameError::ItemUsed(ItemKind::PricePeg))
    );
}

#[test]
fn rearmable_items_can_be_bought_after_expiry() {
    let settings = GameSettings {
        item_policy: ItemPolicy::Rearmable,
        ..quiet()
    };
    let mut game = running(settings, Difficulty::Easy);
    game.purchase_item(ItemKind::PricePeg, 0).unwrap();
    game.on_clock_tick(5_000).unwrap();
    game.purchase_item(ItemKind::PricePeg, 5_000).unwrap();
    assert_eq!(game.modifiers().purchases(), 2);
    assert_eq!(game.portfolio().cash, 1_000_000 - 60_000);
}

#[test]
fn time_freeze_pauses_the_countdown() {
    let mut game = running(quiet(), Difficulty::Easy);
    game.on_clock_tick(1_000).unwrap();
    assert_eq!(game.time_left_secs(), 119);

    game.purchase_item(ItemKind::TimeFreeze, 1_000).unwrap();
    for now_ms in (2_000..=10_000).step_by(1_000) {
        let report = game.on_clock_tick(now_ms).unwrap();
        assert!(report.frozen);
    }
    assert_eq!(game.time_left_secs(), 119);

    let report = game.on_clock_tick(11_000).unwrap();
    assert!(!report.frozen);
    assert_eq!(report.expired, vec![ItemKind::TimeFreeze]);
    assert_eq!(game.time_left_secs(), 118);
}

#[test]
fn countdown_finishes_the_game() {
    let settings = GameSettings {
        duration_secs: 3,
        ..quiet()
    };
    let mut game = running(settings, Difficulty::Normal);
    assert!(game.on_clock_tick(1_000).unwrap().finished.is_none());
    assert!(game.on_clock_tick(2_000).unwrap().finished.is_none());
    let score = game.on_clock_tick(3_000).unwrap().finished.unwrap();
    assert_eq!(score.total_assets, 1_000_000);
    assert_eq!(score.difficulty, Difficulty::Normal);
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.buy(1), Err(GameError::NotRunning));
    assert!(game.on_clock_tick(4_000).is_none());
}

#[test]
fn item_quest_pays_reward_on_next_tick() {
    let settings = GameSettings {
        item_policy: ItemPolicy::Rearmable,
        ..quiet()
    };
    let mut game = running(settings, Difficulty::Easy);
    let mut rng = StdRng::seed_from_u64(3);
    game.purchase_item(ItemKind::TimeFreeze, 0).unwrap();
    game.purchase_item(ItemKind::PricePeg, 0).unwrap();
    game.purchase_item(ItemKind::DoubleGain, 0).unwrap();
    let cash_before = game.portfolio().cash;

    let report = game.on_price_tick(1_000, &mut rng).unwrap();
    assert_eq!(report.quests, vec![Quest::ThreeItems]);
    assert_eq!(game.portfolio().cash, cash_before + 50_000);

    let report = game.on_price_tick(2_000, &mut rng).unwrap();
    assert!(report.quests.is_empty());
}

#[test]
fn start_resets_previous_game() {
    let mut game = running(quiet(), Difficulty::Easy);
    game.buy(2).unwrap();
    game.finish();
    let first = game.session_id();
    game.start().unwrap();
    assert_ne!(game.session_id(), first);
    assert_eq!(game.portfolio().cash, 1_000_000);
    assert!(game.achievements().unlocked().is_empty());
    assert_eq!(game.series().len(), 1);
}

#[test]
fn simulate_plays_to_completion() {
    let mut game = running(GameSettings::default(), Difficulty::Hard);
    let mut rng = StdRng::seed_from_u64(42);
    let mut price_ticks = 0;
    let mut clock_ticks = 0;
    let score = scheduler::simulate(&mut game, &mut rng, |_, _, fired| match fired {
        Fired::Price(_) => price_ticks += 1,
        Fired::Clock(_) => clock_ticks += 1,
    });
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.time_left_secs(), 0);
    assert_eq!(clock_ticks, 120);
    // 600ms ticks over 120s, price first on the final tie
    assert_eq!(price_ticks, 200);
    assert_eq!(score.total_assets, game.total_assets());
}

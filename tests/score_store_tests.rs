use chrono::Utc;

use stock_rush::leaderboard::{Leaderboard, LeaderboardEntry};
use stock_rush::model::difficulty::Difficulty;
use stock_rush::progress::{AchievementBook, ProgressSnapshot};
use stock_rush::score_store::{ScoreStore, ACHIEVEMENTS_KEY, SCORES_KEY};

fn entry(name: &str, score: i64) -> LeaderboardEntry {
    LeaderboardEntry {
        name: name.to_string(),
        score,
        profit_rate: 12.5,
        difficulty: Difficulty::Hard,
        time: Utc::now(),
    }
}

#[test]
fn leaderboard_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("scores.sqlite");

    {
        let store = ScoreStore::open(&path).unwrap();
        assert!(store.load_leaderboard(10).unwrap().is_empty());
        let mut board = Leaderboard::new(10);
        board.insert(entry("alice", 1_125_000));
        board.insert(entry("bob", 1_300_000));
        store.save_leaderboard(&board).unwrap();
    }

    let store = ScoreStore::open(&path).unwrap();
    let board = store.load_leaderboard(10).unwrap();
    let names: Vec<&str> = board.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["bob", "alice"]);
}

#[test]
fn stored_scores_use_the_shared_key_and_json_array() {
    let store = ScoreStore::open_in_memory().unwrap();
    let mut board = Leaderboard::default();
    board.insert(entry("kim", 1_000_001));
    store.save_leaderboard(&board).unwrap();

    let raw = store.get(SCORES_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.is_array());
    assert_eq!(value[0]["profitRate"], "12.50");
}

#[test]
fn loading_with_smaller_capacity_trims() {
    let store = ScoreStore::open_in_memory().unwrap();
    let mut board = Leaderboard::new(10);
    for i in 0..10 {
        board.insert(entry(&format!("p{}", i), i));
    }
    store.save_leaderboard(&board).unwrap();
    let trimmed = store.load_leaderboard(3).unwrap();
    assert_eq!(trimmed.len(), 3);
    assert_eq!(trimmed.entries()[0].score, 9);
}

#[test]
fn achievements_save_load_and_clear() {
    let store = ScoreStore::open_in_memory().unwrap();
    let mut book = AchievementBook::default();
    book.evaluate(&ProgressSnapshot {
        trade_count: 1,
        cash: 1_000_000,
        ..ProgressSnapshot::default()
    });
    store.save_achievements(&book).unwrap();
    assert_eq!(store.load_achievements().unwrap(), book);

    store.clear_achievements().unwrap();
    assert_eq!(store.get(ACHIEVEMENTS_KEY).unwrap(), None);
    assert!(store.load_achievements().unwrap().unlocked().is_empty());
}

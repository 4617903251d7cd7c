use chrono::Utc;

use stock_rush::admin::{execute, AdminGate, RecordCommand};
use stock_rush::error::GameError;
use stock_rush::leaderboard::Leaderboard;
use stock_rush::model::difficulty::Difficulty;

#[test]
fn wrong_secret_is_denied() {
    let gate = AdminGate::new("admin123!@#");
    let mut board = Leaderboard::default();
    assert!(matches!(
        gate.unlock("admin123", &mut board),
        Err(GameError::AdminDenied)
    ));
    assert!(gate.unlock("admin123!@#", &mut board).is_ok());
}

#[test]
fn add_validates_input() {
    let gate = AdminGate::new("s");
    let mut board = Leaderboard::default();
    let mut manager = gate.unlock("s", &mut board).unwrap();
    let now = Utc::now();

    assert!(matches!(
        manager.add("  ", "100", "1.0", Difficulty::Easy, now),
        Err(GameError::InvalidRecord(_))
    ));
    assert!(matches!(
        manager.add("a-name-that-is-way-too-long", "100", "1.0", Difficulty::Easy, now),
        Err(GameError::InvalidRecord(_))
    ));
    assert!(matches!(
        manager.add("kim", "12.5", "1.0", Difficulty::Easy, now),
        Err(GameError::InvalidRecord(_))
    ));
    assert!(matches!(
        manager.add("kim", "100", "NaN", Difficulty::Easy, now),
        Err(GameError::InvalidRecord(_))
    ));
    assert!(manager.records().is_empty());

    assert_eq!(
        manager.add("kim", "1200000", "20", Difficulty::Hard, now),
        Ok(Some(0))
    );
    assert_eq!(manager.records()[0].name, "kim");
}

#[test]
fn delete_uses_one_based_rank() {
    let gate = AdminGate::new("s");
    let mut board = Leaderboard::default();
    let mut manager = gate.unlock("s", &mut board).unwrap();
    let now = Utc::now();
    manager.add("first", "300", "0", Difficulty::Easy, now).unwrap();
    manager.add("second", "200", "0", Difficulty::Easy, now).unwrap();

    assert_eq!(manager.delete(1).unwrap().name, "first");
    assert_eq!(manager.records()[0].name, "second");
    assert_eq!(manager.delete(5), Err(GameError::RecordIndex(5)));
}

#[test]
fn execute_export_and_import_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let gate = AdminGate::new("s");
    let now = Utc::now();

    let mut board = Leaderboard::default();
    {
        let mut manager = gate.unlock("s", &mut board).unwrap();
        manager.add("alice", "1100000", "10", Difficulty::Normal, now).unwrap();
        let out = execute(&RecordCommand::Export(path.clone()), &mut manager, now).unwrap();
        assert!(out[0].contains("exported 1 records"));
    }

    let mut other = Leaderboard::default();
    let mut manager = gate.unlock("s", &mut other).unwrap();
    execute(&RecordCommand::Import(path.clone()), &mut manager, now).unwrap();
    let listed = execute(&RecordCommand::List, &mut manager, now).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].contains("alice"));
}

#[test]
fn execute_import_of_object_fails_and_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"a":1}"#).unwrap();

    let gate = AdminGate::new("s");
    let mut board = Leaderboard::default();
    let mut manager = gate.unlock("s", &mut board).unwrap();
    manager.add("kept", "500", "0", Difficulty::Easy, Utc::now()).unwrap();

    let err = execute(&RecordCommand::Import(path), &mut manager, Utc::now()).unwrap_err();
    assert!(err.to_string().contains("JSON array"));
    assert_eq!(manager.records().len(), 1);
}

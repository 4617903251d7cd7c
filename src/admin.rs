//! Record management behind a shared-secret gate, and the `records` CLI.
//!
//! The secret is compared in plaintext. It keeps casual players away from the
//! delete button and nothing more.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::GameError;
use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::model::difficulty::Difficulty;
use crate::score_store::ScoreStore;

pub const MAX_NAME_CHARS: usize = 20;

#[derive(Debug, Clone)]
pub struct AdminGate {
    secret: String,
}

impl AdminGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.admin.secret.clone())
    }

    pub fn unlock<'a>(
        &self,
        attempt: &str,
        board: &'a mut Leaderboard,
    ) -> Result<RecordManager<'a>, GameError> {
        if attempt != self.secret {
            tracing::warn!("admin unlock rejected");
            return Err(GameError::AdminDenied);
        }
        tracing::info!("admin unlocked");
        Ok(RecordManager { board })
    }
}

pub struct RecordManager<'a> {
    board: &'a mut Leaderboard,
}

impl RecordManager<'_> {
    pub fn records(&self) -> &[LeaderboardEntry] {
        self.board.entries()
    }

    /// `rank` is 1-based, as shown to the admin.
    pub fn delete(&mut self, rank: usize) -> Result<LeaderboardEntry, GameError> {
        if rank == 0 {
            return Err(GameError::RecordIndex(0));
        }
        let removed = self.board.remove(rank - 1)?;
        tracing::info!(rank, name = %removed.name, score = removed.score, "record deleted");
        Ok(removed)
    }

    /// Validates raw admin input and inserts the record. Returns the 0-based
    /// rank it landed at, if it made the board.
    pub fn add(
        &mut self,
        name: &str,
        score: &str,
        profit_rate: &str,
        difficulty: Difficulty,
        time: DateTime<Utc>,
    ) -> Result<Option<usize>, GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidRecord("name is empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(GameError::InvalidRecord(format!(
                "name is longer than {} characters",
                MAX_NAME_CHARS
            )));
        }
        let score: i64 = score
            .trim()
            .parse()
            .map_err(|_| GameError::InvalidRecord(format!("score '{}' is not an integer", score)))?;
        let profit_rate: f64 = profit_rate
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                GameError::InvalidRecord(format!("profit rate '{}' is not a number", profit_rate))
            })?;

        let rank = self.board.insert(LeaderboardEntry {
            name: name.to_string(),
            score,
            profit_rate,
            difficulty,
            time,
        });
        tracing::info!(name, score, ?rank, "record added");
        Ok(rank)
    }

    pub fn export_json(&self) -> Result<String, GameError> {
        self.board
            .to_json()
            .map_err(|e| GameError::Export(e.to_string()))
    }

    pub fn import_json(&mut self, payload: &str) -> Result<usize, GameError> {
        let count = self.board.import_json(payload)?;
        tracing::info!(count, kept = self.board.len(), "records imported");
        Ok(count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordCommand {
    List,
    Export(PathBuf),
    Import(PathBuf),
    Delete(usize),
    Add {
        name: String,
        score: String,
        profit_rate: String,
        difficulty: Difficulty,
    },
}

impl RecordCommand {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some(cmd) = args.first() else {
            return Ok(Self::List);
        };
        let arg = |i: usize, what: &str| {
            args.get(i)
                .cloned()
                .ok_or_else(|| anyhow!("`{}` requires {}", cmd, what))
        };
        match cmd.as_str() {
            "list" => Ok(Self::List),
            "export" => Ok(Self::Export(PathBuf::from(arg(1, "a path")?))),
            "import" => Ok(Self::Import(PathBuf::from(arg(1, "a path")?))),
            "delete" => {
                let rank = arg(1, "a rank")?;
                let rank = rank
                    .parse::<usize>()
                    .with_context(|| format!("invalid rank '{}'", rank))?;
                Ok(Self::Delete(rank))
            }
            "add" => {
                let difficulty = arg(4, "<name> <score> <profit> <difficulty>")?;
                Ok(Self::Add {
                    name: arg(1, "a name")?,
                    score: arg(2, "a score")?,
                    profit_rate: arg(3, "a profit rate")?,
                    difficulty: difficulty.parse::<Difficulty>().map_err(|e| anyhow!(e))?,
                })
            }
            other => bail!(
                "unknown subcommand `{}`. expected one of: list|export|import|delete|add",
                other
            ),
        }
    }

    fn mutates(&self) -> bool {
        matches!(self, Self::Import(_) | Self::Delete(_) | Self::Add { .. })
    }
}

/// Runs one command. Returns the lines to print.
pub fn execute(
    command: &RecordCommand,
    manager: &mut RecordManager<'_>,
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    let lines = match command {
        RecordCommand::List => {
            if manager.records().is_empty() {
                vec!["no records".to_string()]
            } else {
                manager
                    .records()
                    .iter()
                    .enumerate()
                    .map(|(i, e)| format_record(i + 1, e))
                    .collect()
            }
        }
        RecordCommand::Export(path) => {
            let json = manager.export_json()?;
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            vec![format!("exported {} records to {}", manager.records().len(), path.display())]
        }
        RecordCommand::Import(path) => {
            let payload = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let count = manager.import_json(&payload)?;
            vec![format!(
                "imported {} records, {} kept",
                count,
                manager.records().len()
            )]
        }
        RecordCommand::Delete(rank) => {
            let removed = manager.delete(*rank)?;
            vec![format!("deleted #{} {} ({})", rank, removed.name, removed.score)]
        }
        RecordCommand::Add {
            name,
            score,
            profit_rate,
            difficulty,
        } => match manager.add(name, score, profit_rate, *difficulty, now)? {
            Some(rank) => vec![format!("added at rank #{}", rank + 1)],
            None => vec!["score did not make the board".to_string()],
        },
    };
    Ok(lines)
}

pub fn format_record(rank: usize, e: &LeaderboardEntry) -> String {
    format!(
        "#{:<2} {:<20} {:>14} {:>8.2}% {:<6} {}",
        rank,
        e.name,
        e.score,
        e.profit_rate,
        e.difficulty,
        e.time.format("%Y-%m-%d %H:%M")
    )
}

pub fn run_cli(args: &[String]) -> Result<()> {
    let (attempt, rest) = match args.first().map(String::as_str) {
        Some("help" | "--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some("--secret") => {
            let secret = args
                .get(1)
                .cloned()
                .ok_or_else(|| anyhow!("`--secret` requires a value"))?;
            (Some(secret), &args[2..])
        }
        _ => (None, args),
    };
    let command = RecordCommand::parse(rest)?;

    let config = Config::load()?;
    let store = ScoreStore::open(&config.leaderboard.store_path)?;
    let mut board = store.load_leaderboard(config.leaderboard.capacity)?;

    let attempt = match attempt {
        Some(a) => a,
        None => prompt_secret()?,
    };
    let gate = AdminGate::from_config(&config);
    let mut manager = gate.unlock(&attempt, &mut board)?;

    for line in execute(&command, &mut manager, Utc::now())? {
        println!("{}", line);
    }
    if command.mutates() {
        store.save_leaderboard(&board)?;
    }
    Ok(())
}

fn prompt_secret() -> Result<String> {
    print!("admin secret: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read admin secret")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_usage() {
    println!("usage: records [--secret <secret>] <command>");
    println!("  list                                   show the leaderboard");
    println!("  export <path>                          write records as JSON");
    println!("  import <path>                          replace records from JSON");
    println!("  delete <rank>                          remove the record at rank");
    println!("  add <name> <score> <profit> <difficulty>");
}

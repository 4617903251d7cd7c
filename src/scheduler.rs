//! Two periodic timers (price feed and countdown clock) on one explicit
//! timeline. The caller owns the notion of "now"; the TUI feeds it wall-clock
//! milliseconds since game start, [`simulate`] jumps straight to each deadline.

use rand::Rng;

use crate::game::{ClockReport, FinalScore, GameState, TickReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Price,
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub at_ms: u64,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fired {
    Price(TickReport),
    Clock(ClockReport),
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    price_interval_ms: u64,
    clock_interval_ms: u64,
    next_price_at_ms: u64,
    next_clock_at_ms: u64,
    cancelled: bool,
}

impl Scheduler {
    /// Both timers first fire one full interval after `start_ms`.
    pub fn new(price_interval_ms: u64, clock_interval_ms: u64, start_ms: u64) -> Self {
        let price_interval_ms = price_interval_ms.max(1);
        let clock_interval_ms = clock_interval_ms.max(1);
        Self {
            price_interval_ms,
            clock_interval_ms,
            next_price_at_ms: start_ms + price_interval_ms,
            next_clock_at_ms: start_ms + clock_interval_ms,
            cancelled: false,
        }
    }

    pub fn for_game(game: &GameState, start_ms: u64) -> Self {
        Self::new(game.tick_interval_ms(), game.clock_interval_ms(), start_ms)
    }

    /// Earliest pending deadline. The price timer wins ties.
    pub fn next_due(&self) -> Option<Due> {
        if self.cancelled {
            return None;
        }
        let due = if self.next_price_at_ms <= self.next_clock_at_ms {
            Due {
                at_ms: self.next_price_at_ms,
                kind: TimerKind::Price,
            }
        } else {
            Due {
                at_ms: self.next_clock_at_ms,
                kind: TimerKind::Clock,
            }
        };
        Some(due)
    }

    /// Pops the earliest deadline if it is at or before `now_ms` and re-arms
    /// that timer.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Due> {
        let due = self.next_due().filter(|d| d.at_ms <= now_ms)?;
        match due.kind {
            TimerKind::Price => self.next_price_at_ms += self.price_interval_ms,
            TimerKind::Clock => self.next_clock_at_ms += self.clock_interval_ms,
        }
        Some(due)
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Fires every timer due at or before `now_ms`, in deadline order. Cancels
/// the scheduler once the game stops running.
pub fn drive<R: Rng + ?Sized>(
    game: &mut GameState,
    scheduler: &mut Scheduler,
    now_ms: u64,
    rng: &mut R,
) -> Vec<Fired> {
    let mut fired = Vec::new();
    while let Some(due) = scheduler.pop_due(now_ms) {
        let report = match due.kind {
            TimerKind::Price => game.on_price_tick(due.at_ms, rng).map(Fired::Price),
            TimerKind::Clock => game.on_clock_tick(due.at_ms).map(Fired::Clock),
        };
        match report {
            Some(r) => fired.push(r),
            None => {
                scheduler.cancel();
                break;
            }
        }
        if !game.is_running() {
            scheduler.cancel();
            break;
        }
    }
    fired
}

/// Plays a started game to the end without waiting on wall-clock time.
/// `on_fire` sees every handler result, e.g. to let a bot trade.
pub fn simulate<R, F>(game: &mut GameState, rng: &mut R, mut on_fire: F) -> FinalScore
where
    R: Rng + ?Sized,
    F: FnMut(&mut GameState, u64, &Fired),
{
    let mut scheduler = Scheduler::for_game(game, 0);
    while let Some(due) = scheduler.next_due() {
        for fired in drive(game, &mut scheduler, due.at_ms, rng) {
            on_fire(game, due.at_ms, &fired);
        }
    }
    game.finish()
}

pub mod admin;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod modifier;
pub mod progress;
pub mod scheduler;
pub mod score_store;
pub mod ui;

pub mod indicator {
    pub mod bollinger;
    pub mod overlay;
    pub mod sma;
    pub mod trend_line;
}

pub mod market {
    pub mod events;
    pub mod price_model;
}

pub mod model {
    pub mod difficulty;
    pub mod portfolio;
    pub mod price_series;
}

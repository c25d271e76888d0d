use chrono::Duration;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::tracker::Tracker;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracker: Arc<Mutex<Tracker>>,
    /// Search horizon for `/next_pass_all`.
    pub pass_horizon: Duration,
}

impl AppState {
    pub fn new(config: Config, tracker: Tracker) -> Self {
        let pass_horizon = Duration::from_std(config.tracker.pass_horizon)
            .unwrap_or_else(|_| Duration::hours(24));
        Self {
            config: Arc::new(config),
            tracker: Arc::new(Mutex::new(tracker)),
            pass_horizon,
        }
    }
}

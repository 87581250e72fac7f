/// Shared application state for the webserver
///
/// References to the core scorehub systems that route handlers need.
use std::sync::Arc;

use crate::coordinator::ScoreUpdateCoordinator;
use crate::hub::BroadcastHub;
use crate::limiter::SlidingWindowLimiter;
use crate::store::RankedScoreStore;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RankedScoreStore>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub hub: Arc<BroadcastHub>,
    pub coordinator: Arc<ScoreUpdateCoordinator>,

    /// Server startup time
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: Arc<RankedScoreStore>,
        limiter: Arc<SlidingWindowLimiter>,
        hub: Arc<BroadcastHub>,
        coordinator: Arc<ScoreUpdateCoordinator>,
    ) -> Self {
        Self {
            store,
            limiter,
            hub,
            coordinator,
            startup_time: chrono::Utc::now(),
        }
    }

    /// Server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time).num_seconds().max(0) as u64
    }
}

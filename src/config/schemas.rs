/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined with the config_struct! macro: single-source
/// definition, embedded defaults, serde support.
use crate::config_struct;

// ============================================================================
// SERVER CONFIGURATION
// ============================================================================

config_struct! {
    /// HTTP server bind configuration
    pub struct ServerConfig {
        host: String = "127.0.0.1".to_string(),
        port: u16 = 3000,
    }
}

// ============================================================================
// RATE LIMIT CONFIGURATION
// ============================================================================

config_struct! {
    /// Sliding-window rate limiter configuration
    ///
    /// `window_ms` is the window length; `max_weight` the number of admitted
    /// submissions per user within a window. Both are runtime-mutable via
    /// the limiter's update_config.
    pub struct RateLimitConfig {
        window_ms: u64 = 1000,
        max_weight: u32 = 10,
    }
}

// ============================================================================
// LEADERBOARD CONFIGURATION
// ============================================================================

config_struct! {
    /// Leaderboard and live-updates configuration
    pub struct LeaderboardConfig {
        /// Default number of entries returned by top-K queries
        top_count: usize = 10,

        /// Per-subscriber heartbeat interval
        heartbeat_secs: u64 = 30,

        /// Per-subscriber event queue capacity
        subscriber_buffer: usize = 64,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration (data/config.toml)
    pub struct Config {
        server: ServerConfig = ServerConfig::default(),
        rate_limit: RateLimitConfig = RateLimitConfig::default(),
        leaderboard: LeaderboardConfig = LeaderboardConfig::default(),
    }
}

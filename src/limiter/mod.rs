/// Sliding-window rate limiter
///
/// Decides admit/reject per submission attempt, independent of the score
/// store. Window state lives behind the `WindowBackend` trait; if that
/// storage is unavailable the limiter fails OPEN - it admits rather than
/// blocking all traffic. This availability-over-strictness trade-off is
/// deliberate and must be preserved.
use crate::prelude::*;
use std::sync::RwLock;

use crate::arguments::is_debug_limiter_enabled;
use crate::config::RateLimitConfig;
use crate::errors::ConfigurationError;
use crate::logger::{self, LogTag};

pub mod window;

pub use window::{MemoryWindowBackend, WindowBackend};

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Result of a rate-limit check
///
/// A rejected check is an expected outcome, not an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining_points: u32,
    /// Unix milliseconds at which a full window will have elapsed
    pub reset_time: i64,
}

/// Partial configuration update; absent fields keep their current value
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitUpdate {
    pub window_ms: Option<u64>,
    pub max_weight: Option<u32>,
}

// ============================================================================
// SLIDING WINDOW LIMITER
// ============================================================================

pub struct SlidingWindowLimiter {
    backend: Arc<dyn WindowBackend>,
    config: RwLock<RateLimitConfig>,
}

impl SlidingWindowLimiter {
    pub fn new(backend: Arc<dyn WindowBackend>, config: RateLimitConfig) -> Self {
        Self {
            backend,
            config: RwLock::new(config),
        }
    }

    fn config_snapshot(&self) -> RateLimitConfig {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Check whether `user_id` may submit now, recording the attempt on
    /// admission
    ///
    /// Purges expired entries, counts the in-window weight and decides - as
    /// one atomic step per user at the storage layer. Every check consumes
    /// exactly one slot regardless of `weight` (the parameter is reserved
    /// for future extension). Rejected attempts are not recorded.
    pub async fn check(&self, user_id: &str, _weight: u32) -> RateLimitResult {
        let config = self.config_snapshot();
        let now_ms = Utc::now().timestamp_millis();
        let reset_time = now_ms + config.window_ms as i64;

        // Uniquify against other entries recorded in the same millisecond
        let member = format!("{}-{}", now_ms, rand::random::<f64>());

        match self
            .backend
            .check_and_record(user_id, now_ms, config.window_ms, config.max_weight, &member)
            .await
        {
            Ok(check) => {
                let remaining = config.max_weight.saturating_sub(check.current_weight);

                if is_debug_limiter_enabled() {
                    logger::debug(
                        LogTag::Limiter,
                        &format!(
                            "check {}: admitted={} weight={}/{}",
                            user_id, check.admitted, check.current_weight, config.max_weight
                        ),
                    );
                }

                if check.admitted {
                    RateLimitResult {
                        allowed: true,
                        remaining_points: remaining.saturating_sub(1),
                        reset_time,
                    }
                } else {
                    RateLimitResult {
                        allowed: false,
                        remaining_points: remaining,
                        reset_time,
                    }
                }
            }
            Err(e) => {
                // Fail open: admit rather than block all traffic
                logger::warning(
                    LogTag::Limiter,
                    &format!("window storage unavailable, failing open: {}", e),
                );
                RateLimitResult {
                    allowed: true,
                    remaining_points: config.max_weight,
                    reset_time,
                }
            }
        }
    }

    /// Current rate-limit state for a user without recording an attempt
    ///
    /// Purges expired entries as a side effect; never admits or rejects.
    pub async fn status(&self, user_id: &str) -> RateLimitResult {
        let config = self.config_snapshot();
        let now_ms = Utc::now().timestamp_millis();
        let reset_time = now_ms + config.window_ms as i64;

        match self
            .backend
            .current_weight(user_id, now_ms, config.window_ms)
            .await
        {
            Ok(current) => RateLimitResult {
                allowed: current < config.max_weight,
                remaining_points: config.max_weight.saturating_sub(current),
                reset_time,
            },
            Err(e) => {
                logger::warning(
                    LogTag::Limiter,
                    &format!("window storage unavailable, failing open: {}", e),
                );
                RateLimitResult {
                    allowed: true,
                    remaining_points: config.max_weight,
                    reset_time,
                }
            }
        }
    }

    /// In-window admitted timestamps for a user (debugging aid)
    pub async fn history(&self, user_id: &str) -> Vec<i64> {
        let config = self.config_snapshot();
        let now_ms = Utc::now().timestamp_millis();

        match self.backend.history(user_id, now_ms, config.window_ms).await {
            Ok(timestamps) => timestamps,
            Err(e) => {
                logger::warning(
                    LogTag::Limiter,
                    &format!("window storage unavailable, empty history: {}", e),
                );
                vec![]
            }
        }
    }

    /// Apply a partial configuration update
    ///
    /// Takes effect for all checks issued after the call returns.
    pub fn update_config(
        &self,
        update: RateLimitUpdate,
    ) -> Result<RateLimitConfig, ScorehubError> {
        if let Some(window_ms) = update.window_ms {
            if window_ms == 0 {
                return Err(ConfigurationError::InvalidValue {
                    field: "windowMs",
                    reason: "must be a positive integer".to_string(),
                }
                .into());
            }
        }
        if let Some(max_weight) = update.max_weight {
            if max_weight == 0 {
                return Err(ConfigurationError::InvalidValue {
                    field: "maxWeight",
                    reason: "must be a positive integer".to_string(),
                }
                .into());
            }
        }

        let mut config = self
            .config
            .write()
            .expect("Failed to acquire limiter config write lock");

        if let Some(window_ms) = update.window_ms {
            config.window_ms = window_ms;
        }
        if let Some(max_weight) = update.max_weight {
            config.max_weight = max_weight;
        }

        Ok(config.clone())
    }

    /// Current configuration snapshot
    pub fn get_config(&self) -> RateLimitConfig {
        self.config_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn make_limiter(window_ms: u64, max_weight: u32) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(
            Arc::new(MemoryWindowBackend::new()),
            RateLimitConfig {
                window_ms,
                max_weight,
            },
        )
    }

    /// Backend that always fails, for the fail-open path
    struct BrokenWindowBackend;

    #[async_trait]
    impl WindowBackend for BrokenWindowBackend {
        async fn check_and_record(
            &self,
            _user_id: &str,
            _now_ms: i64,
            _window_ms: u64,
            _max_weight: u32,
            _member: &str,
        ) -> Result<window::WindowCheck, StoreError> {
            Err(StoreError::Unavailable {
                operation: "check_and_record",
                reason: "connection refused".to_string(),
            })
        }

        async fn current_weight(
            &self,
            _user_id: &str,
            _now_ms: i64,
            _window_ms: u64,
        ) -> Result<u32, StoreError> {
            Err(StoreError::Unavailable {
                operation: "current_weight",
                reason: "connection refused".to_string(),
            })
        }

        async fn history(
            &self,
            _user_id: &str,
            _now_ms: i64,
            _window_ms: u64,
        ) -> Result<Vec<i64>, StoreError> {
            Err(StoreError::Unavailable {
                operation: "history",
                reason: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_admits_up_to_capacity_then_rejects() {
        let limiter = make_limiter(60_000, 3);

        for expected_remaining in [2, 1, 0] {
            let result = limiter.check("u1", 1).await;
            assert!(result.allowed);
            assert_eq!(result.remaining_points, expected_remaining);
        }

        let rejected = limiter.check("u1", 1).await;
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining_points, 0);
    }

    #[tokio::test]
    async fn test_window_expiry_readmits() {
        let limiter = make_limiter(100, 1);

        assert!(limiter.check("u1", 1).await.allowed);
        assert!(!limiter.check("u1", 1).await.allowed);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(limiter.check("u1", 1).await.allowed);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let limiter = make_limiter(60_000, 1);

        assert!(limiter.check("u1", 1).await.allowed);
        assert!(limiter.check("u2", 1).await.allowed);
        assert!(!limiter.check("u1", 1).await.allowed);
    }

    #[tokio::test]
    async fn test_concurrent_checks_never_overshoot() {
        let limiter = Arc::new(make_limiter(60_000, 10));
        let mut handles = Vec::new();

        for _ in 0..20 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(
                async move { limiter.check("u1", 1).await.allowed },
            ));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }

    #[tokio::test]
    async fn test_status_does_not_consume() {
        let limiter = make_limiter(60_000, 2);

        limiter.check("u1", 1).await;
        let status = limiter.status("u1").await;
        assert!(status.allowed);
        assert_eq!(status.remaining_points, 1);

        // status() did not record anything
        let again = limiter.status("u1").await;
        assert_eq!(again.remaining_points, 1);
        assert_eq!(limiter.history("u1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_open_when_storage_unavailable() {
        let limiter = SlidingWindowLimiter::new(
            Arc::new(BrokenWindowBackend),
            RateLimitConfig {
                window_ms: 1_000,
                max_weight: 5,
            },
        );

        let result = limiter.check("u1", 1).await;
        assert!(result.allowed);
        assert_eq!(result.remaining_points, 5);

        let status = limiter.status("u1").await;
        assert!(status.allowed);
        assert!(limiter.history("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_config_affects_future_checks() {
        let limiter = make_limiter(60_000, 1);

        assert!(limiter.check("u1", 1).await.allowed);
        assert!(!limiter.check("u1", 1).await.allowed);

        limiter
            .update_config(RateLimitUpdate {
                max_weight: Some(3),
                window_ms: None,
            })
            .unwrap();

        assert!(limiter.check("u1", 1).await.allowed);
        assert_eq!(limiter.get_config().max_weight, 3);
    }

    #[tokio::test]
    async fn test_update_config_rejects_zero() {
        let limiter = make_limiter(60_000, 1);

        assert!(limiter
            .update_config(RateLimitUpdate {
                window_ms: Some(0),
                max_weight: None,
            })
            .is_err());
        // Unchanged
        assert_eq!(limiter.get_config().window_ms, 60_000);
    }
}

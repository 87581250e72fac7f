/// Score update coordinator
///
/// Orchestrates one submission end-to-end: limiter first, then on admission
/// the store increment (one point per accepted submission), a fresh top-K
/// snapshot, and the two broadcasts (individual update, then leaderboard
/// snapshot). A rejected submission returns without touching the store or
/// the hub. A store failure after admission is reported distinctly from a
/// rate-limit rejection; the limiter slot consumed for that attempt is not
/// refunded.
use crate::prelude::*;

use crate::config;
use crate::events::Event;
use crate::hub::BroadcastHub;
use crate::limiter::{RateLimitResult, SlidingWindowLimiter};
use crate::logger::{self, LogTag};
use crate::store::{RankedScoreStore, UserScore};

/// Points added per accepted submission
const POINTS_PER_SUBMISSION: i64 = 1;

/// Outcome of one submission
#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub accepted: bool,
    pub user_score: Option<UserScore>,
    pub rate_limit: RateLimitResult,
}

pub struct ScoreUpdateCoordinator {
    store: Arc<RankedScoreStore>,
    limiter: Arc<SlidingWindowLimiter>,
    hub: Arc<BroadcastHub>,
}

impl ScoreUpdateCoordinator {
    pub fn new(
        store: Arc<RankedScoreStore>,
        limiter: Arc<SlidingWindowLimiter>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        Self { store, limiter, hub }
    }

    /// Process one score submission
    ///
    /// Returns Ok with `accepted=false` on throttling (expected outcome) and
    /// Err only on store failure.
    pub async fn submit(
        &self,
        user_id: &str,
        username: &str,
    ) -> Result<SubmitResult, ScorehubError> {
        let rate_limit = self.limiter.check(user_id, 1).await;

        if !rate_limit.allowed {
            logger::debug(
                LogTag::Coordinator,
                &format!("submission throttled for {}", user_id),
            );
            return Ok(SubmitResult {
                accepted: false,
                user_score: None,
                rate_limit,
            });
        }

        // The limiter slot consumed above is not refunded if this fails
        let user_score = self
            .store
            .increment(user_id, username, POINTS_PER_SUBMISSION)
            .await
            .map_err(|e| {
                logger::error(
                    LogTag::Coordinator,
                    &format!("score increment failed for {}: {}", user_id, e),
                );
                ScorehubError::Store(e)
            })?;

        let top_count = config::with_config(|cfg| cfg.leaderboard.top_count);
        let leaderboard = self.store.top_k(top_count).await?;

        self.hub.publish(Event::user_score_update(&user_score)).await;
        self.hub.publish(Event::leaderboard_update(&leaderboard)).await;

        Ok(SubmitResult {
            accepted: true,
            user_score: Some(user_score),
            rate_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::events::EventKind;
    use crate::hub::BroadcastHub;
    use crate::limiter::MemoryWindowBackend;
    use crate::store::{MemoryScoreBackend, ScoreBackend};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn make_coordinator(
        window_ms: u64,
        max_weight: u32,
    ) -> (ScoreUpdateCoordinator, Arc<BroadcastHub>) {
        config::ensure_loaded();

        let store = Arc::new(RankedScoreStore::new(Arc::new(MemoryScoreBackend::new())));
        let limiter = Arc::new(SlidingWindowLimiter::new(
            Arc::new(MemoryWindowBackend::new()),
            RateLimitConfig {
                window_ms,
                max_weight,
            },
        ));
        let hub = BroadcastHub::new(Duration::from_secs(60));

        (
            ScoreUpdateCoordinator::new(store, limiter, Arc::clone(&hub)),
            hub,
        )
    }

    #[tokio::test]
    async fn test_accepted_submission_scores_and_broadcasts() {
        let (coordinator, hub) = make_coordinator(60_000, 10);
        let (tx, mut rx) = mpsc::channel(16);
        hub.attach("observer".to_string(), tx).await;
        rx.recv().await.unwrap(); // connection message

        let result = coordinator.submit("u1", "Alice").await.unwrap();
        assert!(result.accepted);
        assert_eq!(result.user_score.as_ref().unwrap().score, 1);

        // Individual update first, snapshot second
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::UserScoreUpdate);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::LeaderboardUpdate);
    }

    #[tokio::test]
    async fn test_throttled_submission_touches_nothing() {
        let (coordinator, hub) = make_coordinator(60_000, 1);
        let (tx, mut rx) = mpsc::channel(16);
        hub.attach("observer".to_string(), tx).await;
        rx.recv().await.unwrap(); // connection message

        coordinator.submit("u1", "Alice").await.unwrap();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        let throttled = coordinator.submit("u1", "Alice").await.unwrap();
        assert!(!throttled.accepted);
        assert!(throttled.user_score.is_none());
        assert_eq!(throttled.rate_limit.remaining_points, 0);

        // No broadcast happened for the rejected attempt
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_full_window_scenario() {
        // windowMs=1000, maxWeight=10: ten accepted, eleventh rejected,
        // accepted again after the window passes
        let (coordinator, _hub) = make_coordinator(1_000, 10);

        let mut last = None;
        for _ in 0..10 {
            let result = coordinator.submit("u1", "Alice").await.unwrap();
            assert!(result.accepted);
            last = Some(result);
        }
        let last = last.unwrap();
        assert_eq!(last.user_score.as_ref().unwrap().score, 10);
        assert_eq!(last.rate_limit.remaining_points, 0);

        let eleventh = coordinator.submit("u1", "Alice").await.unwrap();
        assert!(!eleventh.accepted);
        assert_eq!(eleventh.rate_limit.remaining_points, 0);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        let twelfth = coordinator.submit("u1", "Alice").await.unwrap();
        assert!(twelfth.accepted);
        assert_eq!(twelfth.user_score.unwrap().score, 11);
    }

    /// Score backend that always fails
    struct BrokenScoreBackend;

    #[async_trait]
    impl ScoreBackend for BrokenScoreBackend {
        async fn increment(
            &self,
            _user_id: &str,
            _username: &str,
            _delta: i64,
        ) -> Result<UserScore, StoreError> {
            Err(StoreError::Unavailable {
                operation: "increment",
                reason: "connection refused".to_string(),
            })
        }

        async fn ranked(&self, _limit: usize) -> Result<Vec<UserScore>, StoreError> {
            Err(StoreError::Unavailable {
                operation: "ranked",
                reason: "connection refused".to_string(),
            })
        }

        async fn score_and_rank(
            &self,
            _user_id: &str,
        ) -> Result<Option<(UserScore, usize)>, StoreError> {
            Err(StoreError::Unavailable {
                operation: "score_and_rank",
                reason: "connection refused".to_string(),
            })
        }

        async fn total_users(&self) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable {
                operation: "total_users",
                reason: "connection refused".to_string(),
            })
        }

        async fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable {
                operation: "clear",
                reason: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_distinct_from_throttling() {
        config::ensure_loaded();

        let store = Arc::new(RankedScoreStore::new(Arc::new(BrokenScoreBackend)));
        let limiter = Arc::new(SlidingWindowLimiter::new(
            Arc::new(MemoryWindowBackend::new()),
            RateLimitConfig {
                window_ms: 60_000,
                max_weight: 2,
            },
        ));
        let hub = BroadcastHub::new(Duration::from_secs(60));
        let coordinator = ScoreUpdateCoordinator::new(store, limiter.clone(), hub);

        let err = coordinator.submit("u1", "Alice").await.unwrap_err();
        assert!(matches!(err, ScorehubError::Store(_)));

        // The admitted check consumed a slot even though the increment failed
        assert_eq!(limiter.status("u1").await.remaining_points, 1);
    }
}

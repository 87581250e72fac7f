/// Ranked score store
///
/// Owns per-user score state: atomic increment, point-in-time top-K, and
/// per-user rank queries. The actual state engine is pluggable behind the
/// `ScoreBackend` trait; `MemoryScoreBackend` is the in-process reference
/// implementation.
use crate::prelude::*;

pub mod backend;
pub mod memory;

pub use backend::ScoreBackend;
pub use memory::MemoryScoreBackend;

// ============================================================================
// TYPES
// ============================================================================

/// A user's current score state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScore {
    pub user_id: String,
    pub username: String,
    pub score: i64,
    pub last_updated: DateTime<Utc>,
}

/// A `UserScore` plus its 1-based rank at a specific observation instant
///
/// Transient view, recomputed on each query. Ranks are assigned by
/// descending score; ties break by first-seen order so repeated queries
/// against unchanged state return identical ranks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub user: UserScore,
    pub rank: usize,
}

// ============================================================================
// RANKED SCORE STORE
// ============================================================================

pub struct RankedScoreStore {
    backend: Arc<dyn ScoreBackend>,
}

impl RankedScoreStore {
    pub fn new(backend: Arc<dyn ScoreBackend>) -> Self {
        Self { backend }
    }

    /// Atomically add `delta` to the user's score
    ///
    /// Creates the user with score=delta if absent; updates display name and
    /// timestamp. Concurrent increments to the same user never lose updates.
    pub async fn increment(
        &self,
        user_id: &str,
        username: &str,
        delta: i64,
    ) -> Result<UserScore, StoreError> {
        self.backend.increment(user_id, username, delta).await
    }

    /// Up to `k` entries in descending score order, ranks 1..k
    ///
    /// Reflects a single consistent snapshot of each user's state.
    pub async fn top_k(&self, k: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        if k == 0 {
            return Ok(vec![]);
        }

        let ranked = self.backend.ranked(k).await?;
        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(i, user)| LeaderboardEntry { user, rank: i + 1 })
            .collect())
    }

    /// The user's current score and rank against the full population
    ///
    /// Returns None for a user that has never scored.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<LeaderboardEntry>, StoreError> {
        let found = self.backend.score_and_rank(user_id).await?;
        Ok(found.map(|(user, rank)| LeaderboardEntry { user, rank }))
    }

    /// Number of distinct users with at least one recorded score
    pub async fn total_users(&self) -> Result<usize, StoreError> {
        self.backend.total_users().await
    }

    /// Remove all user state
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.backend.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> RankedScoreStore {
        RankedScoreStore::new(Arc::new(MemoryScoreBackend::new()))
    }

    #[tokio::test]
    async fn test_increment_creates_and_accumulates() {
        let store = make_store();

        let first = store.increment("u1", "Alice", 3).await.unwrap();
        assert_eq!(first.score, 3);

        let second = store.increment("u1", "Alice", -1).await.unwrap();
        assert_eq!(second.score, 2);
        assert_eq!(store.total_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_top_k_orders_descending() {
        let store = make_store();
        store.increment("u1", "Alice", 5).await.unwrap();
        store.increment("u2", "Bob", 8).await.unwrap();

        let top = store.top_k(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user.user_id, "u2");
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[1].user.user_id, "u1");
        assert_eq!(top[1].rank, 2);
    }

    #[tokio::test]
    async fn test_top_k_zero_is_empty() {
        let store = make_store();
        store.increment("u1", "Alice", 1).await.unwrap();
        assert!(store.top_k(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tie_break_is_stable_across_queries() {
        let store = make_store();
        store.increment("u1", "Alice", 4).await.unwrap();
        store.increment("u2", "Bob", 4).await.unwrap();
        store.increment("u3", "Carol", 4).await.unwrap();

        let first = store.top_k(3).await.unwrap();
        let second = store.top_k(3).await.unwrap();

        let order: Vec<&str> = first.iter().map(|e| e.user.user_id.as_str()).collect();
        assert_eq!(order, vec!["u1", "u2", "u3"]); // first-seen order on ties
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.user.user_id, b.user.user_id);
            assert_eq!(a.rank, b.rank);
        }
    }

    #[tokio::test]
    async fn test_get_user_rank_against_population() {
        let store = make_store();
        store.increment("u1", "Alice", 5).await.unwrap();
        store.increment("u2", "Bob", 8).await.unwrap();
        store.increment("u3", "Carol", 2).await.unwrap();

        let alice = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(alice.rank, 2);
        assert_eq!(alice.user.score, 5);

        assert!(store.get_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let store = make_store();
        store.increment("u1", "Alice", 5).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.total_users().await.unwrap(), 0);
        assert!(store.top_k(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_increments_do_not_lose_updates() {
        let store = Arc::new(make_store());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    store.increment("u1", "Alice", 1).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let alice = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(alice.user.score, 8 * 50);
    }
}

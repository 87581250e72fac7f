/// Pluggable state engine behind the ranked score store
///
/// The original deployment target is an external sorted-set engine; the trait
/// is the seam such an engine plugs into. Every read-modify-write (increment)
/// is a single call so the backend can execute it under its own per-call
/// critical section.
use crate::prelude::*;

use super::UserScore;

#[async_trait]
pub trait ScoreBackend: Send + Sync {
    /// Atomically add `delta` to the user's score, creating the user if
    /// absent, and return the resulting state.
    async fn increment(
        &self,
        user_id: &str,
        username: &str,
        delta: i64,
    ) -> Result<UserScore, StoreError>;

    /// Up to `limit` users in descending score order, ties broken by
    /// first-seen order.
    async fn ranked(&self, limit: usize) -> Result<Vec<UserScore>, StoreError>;

    /// One user's state plus 1-based rank against the full population.
    async fn score_and_rank(&self, user_id: &str)
        -> Result<Option<(UserScore, usize)>, StoreError>;

    /// Number of distinct users with recorded scores.
    async fn total_users(&self) -> Result<usize, StoreError>;

    /// Drop all user state.
    async fn clear(&self) -> Result<(), StoreError>;
}

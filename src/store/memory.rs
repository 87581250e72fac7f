/// In-memory score backend
///
/// Reference implementation of `ScoreBackend`. A single RwLock guards the
/// user table, so each operation is one critical section: increments to the
/// same user are linearizable and a query never observes a half-applied
/// update for any single user.
use crate::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::backend::ScoreBackend;
use super::UserScore;

/// Per-user record; `seq` is the first-seen sequence used as rank tie-break
#[derive(Debug, Clone)]
struct UserRecord {
    username: String,
    score: i64,
    last_updated: DateTime<Utc>,
    seq: u64,
}

pub struct MemoryScoreBackend {
    table: RwLock<HashMap<String, UserRecord>>,
    next_seq: AtomicU64,
}

impl MemoryScoreBackend {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    fn to_user_score(user_id: &str, record: &UserRecord) -> UserScore {
        UserScore {
            user_id: user_id.to_string(),
            username: record.username.clone(),
            score: record.score,
            last_updated: record.last_updated,
        }
    }

    /// Descending score, ties by lower (earlier) sequence
    fn sort_records(records: &mut Vec<(String, UserRecord)>) {
        records.sort_unstable_by(|(_, a), (_, b)| {
            b.score.cmp(&a.score).then(a.seq.cmp(&b.seq))
        });
    }
}

impl Default for MemoryScoreBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoreBackend for MemoryScoreBackend {
    async fn increment(
        &self,
        user_id: &str,
        username: &str,
        delta: i64,
    ) -> Result<UserScore, StoreError> {
        let mut table = self.table.write().await;

        let record = table.entry(user_id.to_string()).or_insert_with(|| UserRecord {
            username: username.to_string(),
            score: 0,
            last_updated: Utc::now(),
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
        });

        record.score += delta;
        record.username = username.to_string();
        record.last_updated = Utc::now();

        Ok(Self::to_user_score(user_id, record))
    }

    async fn ranked(&self, limit: usize) -> Result<Vec<UserScore>, StoreError> {
        let table = self.table.read().await;

        let mut records: Vec<(String, UserRecord)> = table
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();
        Self::sort_records(&mut records);

        Ok(records
            .into_iter()
            .take(limit)
            .map(|(id, record)| Self::to_user_score(&id, &record))
            .collect())
    }

    async fn score_and_rank(
        &self,
        user_id: &str,
    ) -> Result<Option<(UserScore, usize)>, StoreError> {
        let table = self.table.read().await;

        let record = match table.get(user_id) {
            Some(record) => record,
            None => return Ok(None),
        };

        // 1-based rank: users strictly ahead by score, or tied but seen earlier
        let ahead = table
            .values()
            .filter(|other| {
                other.score > record.score
                    || (other.score == record.score && other.seq < record.seq)
            })
            .count();

        Ok(Some((Self::to_user_score(user_id, record), ahead + 1)))
    }

    async fn total_users(&self) -> Result<usize, StoreError> {
        Ok(self.table.read().await.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.table.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_seen_sequence_survives_score_changes() {
        let backend = MemoryScoreBackend::new();
        backend.increment("u1", "Alice", 1).await.unwrap();
        backend.increment("u2", "Bob", 1).await.unwrap();

        // Bob overtakes, then falls back into a tie - u1 still ranks first
        backend.increment("u2", "Bob", 5).await.unwrap();
        backend.increment("u2", "Bob", -5).await.unwrap();

        let ranked = backend.ranked(10).await.unwrap();
        assert_eq!(ranked[0].user_id, "u1");
        assert_eq!(ranked[1].user_id, "u2");
    }

    #[tokio::test]
    async fn test_increment_updates_display_name() {
        let backend = MemoryScoreBackend::new();
        backend.increment("u1", "Alice", 1).await.unwrap();
        let updated = backend.increment("u1", "Alicia", 1).await.unwrap();

        assert_eq!(updated.username, "Alicia");
        assert_eq!(updated.score, 2);
    }
}

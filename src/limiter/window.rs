/// Rate-window storage
///
/// Per-user ordered timestamp records, bounded to the configured window.
/// `check_and_record` is the single atomic purge-count-decide-record step:
/// two concurrent checks for the same user can never both observe a free
/// slot and overshoot the capacity.
use crate::prelude::*;
use tokio::sync::Mutex;

/// Outcome of one atomic check
#[derive(Debug, Clone, Copy)]
pub struct WindowCheck {
    pub admitted: bool,
    /// In-window weight observed after the purge, before any recording
    pub current_weight: u32,
}

#[async_trait]
pub trait WindowBackend: Send + Sync {
    /// Purge expired entries, count, decide, and record on admission - as one
    /// atomic step with respect to concurrent calls for the same user.
    async fn check_and_record(
        &self,
        user_id: &str,
        now_ms: i64,
        window_ms: u64,
        max_weight: u32,
        member: &str,
    ) -> Result<WindowCheck, StoreError>;

    /// Purge expired entries and return the in-window weight. Read-only
    /// projection apart from the purge; never records.
    async fn current_weight(
        &self,
        user_id: &str,
        now_ms: i64,
        window_ms: u64,
    ) -> Result<u32, StoreError>;

    /// Purge expired entries and return the in-window admitted timestamps.
    async fn history(
        &self,
        user_id: &str,
        now_ms: i64,
        window_ms: u64,
    ) -> Result<Vec<i64>, StoreError>;
}

// ============================================================================
// IN-MEMORY WINDOW BACKEND
// ============================================================================

#[derive(Debug, Clone)]
struct WindowEntry {
    ts_ms: i64,
    /// Uniquified against same-millisecond collisions
    member: String,
}

#[derive(Debug, Default)]
struct WindowRecord {
    entries: Vec<WindowEntry>,
    /// Whole-record expiry, refreshed to now + window on each admission
    expires_at_ms: i64,
}

pub struct MemoryWindowBackend {
    windows: Mutex<HashMap<String, WindowRecord>>,
}

impl MemoryWindowBackend {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Drop expired entries for one user; removes the whole record when empty
    fn purge(windows: &mut HashMap<String, WindowRecord>, user_id: &str, window_start: i64, now_ms: i64) {
        let empty = match windows.get_mut(user_id) {
            Some(record) => {
                if now_ms >= record.expires_at_ms {
                    record.entries.clear();
                } else {
                    record.entries.retain(|e| e.ts_ms >= window_start);
                }
                record.entries.is_empty()
            }
            None => return,
        };

        if empty {
            windows.remove(user_id);
        }
    }
}

impl Default for MemoryWindowBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowBackend for MemoryWindowBackend {
    async fn check_and_record(
        &self,
        user_id: &str,
        now_ms: i64,
        window_ms: u64,
        max_weight: u32,
        member: &str,
    ) -> Result<WindowCheck, StoreError> {
        let mut windows = self.windows.lock().await;
        let window_start = now_ms - window_ms as i64;

        Self::purge(&mut windows, user_id, window_start, now_ms);

        let current_weight = windows
            .get(user_id)
            .map(|r| r.entries.len() as u32)
            .unwrap_or(0);

        if current_weight + 1 > max_weight {
            return Ok(WindowCheck {
                admitted: false,
                current_weight,
            });
        }

        let record = windows.entry(user_id.to_string()).or_default();
        record.entries.push(WindowEntry {
            ts_ms: now_ms,
            member: member.to_string(),
        });
        record.expires_at_ms = now_ms + window_ms as i64;

        Ok(WindowCheck {
            admitted: true,
            current_weight,
        })
    }

    async fn current_weight(
        &self,
        user_id: &str,
        now_ms: i64,
        window_ms: u64,
    ) -> Result<u32, StoreError> {
        let mut windows = self.windows.lock().await;
        let window_start = now_ms - window_ms as i64;

        Self::purge(&mut windows, user_id, window_start, now_ms);

        Ok(windows
            .get(user_id)
            .map(|r| r.entries.len() as u32)
            .unwrap_or(0))
    }

    async fn history(
        &self,
        user_id: &str,
        now_ms: i64,
        window_ms: u64,
    ) -> Result<Vec<i64>, StoreError> {
        let mut windows = self.windows.lock().await;
        let window_start = now_ms - window_ms as i64;

        Self::purge(&mut windows, user_id, window_start, now_ms);

        Ok(windows
            .get(user_id)
            .map(|r| r.entries.iter().map(|e| e.ts_ms).collect())
            .unwrap_or_default())
    }
}

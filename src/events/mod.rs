/// Broadcast event schema and wire encoding
///
/// Every message pushed to subscribers is an `Event`: an immutable tagged
/// JSON payload carrying a timestamp, encoded on the wire as a text
/// event-stream frame. Events are fire-and-forget - no persistence, no
/// replay.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::{LeaderboardEntry, UserScore};

// ============================================================================
// EVENT KINDS
// ============================================================================

/// Kind tags for broadcast events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LeaderboardUpdate,
    UserScoreUpdate,
    SystemMessage,
    Heartbeat,
}

impl EventKind {
    /// Wire name used in the `event:` field
    pub fn code(&self) -> &'static str {
        match self {
            EventKind::LeaderboardUpdate => "leaderboard_update",
            EventKind::UserScoreUpdate => "user_score_update",
            EventKind::SystemMessage => "system_message",
            EventKind::Heartbeat => "heartbeat",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// EVENT
// ============================================================================

/// An immutable broadcast event
///
/// `data` always carries at least a `timestamp` field (RFC 3339).
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub id: Option<String>,
    pub retry_ms: Option<u64>,
    pub data: serde_json::Value,
}

impl Event {
    /// Full leaderboard snapshot
    pub fn leaderboard_update(entries: &[LeaderboardEntry]) -> Self {
        Self {
            kind: EventKind::LeaderboardUpdate,
            id: None,
            retry_ms: None,
            data: serde_json::json!({
                "leaderboard": entries,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        }
    }

    /// Single user's score changed
    pub fn user_score_update(score: &UserScore) -> Self {
        Self {
            kind: EventKind::UserScoreUpdate,
            id: None,
            retry_ms: None,
            data: serde_json::json!({
                "userScore": score,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        }
    }

    /// Operational notice for subscribers
    pub fn system_message(message: &str) -> Self {
        Self {
            kind: EventKind::SystemMessage,
            id: None,
            retry_ms: None,
            data: serde_json::json!({
                "message": message,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        }
    }

    /// Keepalive frame
    pub fn heartbeat() -> Self {
        Self {
            kind: EventKind::Heartbeat,
            id: None,
            retry_ms: None,
            data: serde_json::json!({
                "timestamp": Utc::now().to_rfc3339(),
            }),
        }
    }

    /// Set the optional `id:` field
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Encode as a text event-stream frame
    ///
    /// Grammar: optional `id:` / `event:` / `retry:` lines, one `data:` line
    /// per payload line, terminated by a blank line. Multi-line payloads are
    /// split on newlines and each line prefixed independently.
    pub fn encode(&self) -> String {
        let mut frame = String::new();

        if let Some(id) = &self.id {
            frame.push_str(&format!("id: {}\n", id));
        }

        frame.push_str(&format!("event: {}\n", self.kind.code()));

        if let Some(retry) = self.retry_ms {
            frame.push_str(&format!("retry: {}\n", retry));
        }

        // String payloads pass through raw; everything else is serialized as
        // single-line JSON
        let data = match &self.data {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        for line in data.split('\n') {
            frame.push_str(&format!("data: {}\n", line));
        }

        frame.push('\n');
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(EventKind::LeaderboardUpdate.code(), "leaderboard_update");
        assert_eq!(EventKind::UserScoreUpdate.code(), "user_score_update");
        assert_eq!(EventKind::SystemMessage.code(), "system_message");
        assert_eq!(EventKind::Heartbeat.code(), "heartbeat");
    }

    #[test]
    fn test_encode_frame_grammar() {
        let event = Event::system_message("hello").with_id("42");
        let frame = event.encode();

        assert!(frame.starts_with("id: 42\n"));
        assert!(frame.contains("event: system_message\n"));
        assert!(frame.contains("data: {"));
        assert!(frame.ends_with("\n\n"));
    }

    #[test]
    fn test_encode_splits_multiline_payload() {
        let event = Event {
            kind: EventKind::SystemMessage,
            id: None,
            retry_ms: Some(3000),
            data: serde_json::Value::String("first\nsecond".to_string()),
        };
        let frame = event.encode();

        assert!(frame.contains("retry: 3000\n"));
        assert!(frame.contains("data: first\n"));
        assert!(frame.contains("data: second\n"));
        assert_eq!(frame.matches("data: ").count(), 2);
    }

    #[test]
    fn test_payload_carries_timestamp() {
        let event = Event::heartbeat();
        assert!(event.data.get("timestamp").is_some());
    }
}

/// Broadcast hub - fan-out of events to live subscribers
///
/// Owns the set of subscriber connections. Accepts structured events and
/// delivers them to every attached subscriber, pruning dead sinks after each
/// fan-out pass. Each subscriber gets its own heartbeat task, started at
/// attach and cancelled at detach, so one slow subscriber never stalls the
/// others' keepalives. Delivery is at-most-once, best-effort.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::arguments::is_debug_hub_enabled;
use crate::errors::SinkError;
use crate::events::Event;
use crate::logger::{self, LogTag};

// ============================================================================
// HUB TYPES
// ============================================================================

/// Subscriber ID (client-supplied or generated at attach)
pub type SubscriberId = String;

/// Per-subscriber sink (bounded channel)
pub type EventSender = mpsc::Sender<Event>;

struct Subscriber {
    sender: EventSender,
    heartbeat: JoinHandle<()>,
}

// ============================================================================
// BROADCAST HUB
// ============================================================================

pub struct BroadcastHub {
    /// Attached subscribers (id -> sink + heartbeat task)
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,

    /// Heartbeat interval for all subscribers
    heartbeat_interval: Duration,

    /// Fan-out counters
    events_sent: AtomicU64,
    events_dropped: AtomicU64,
}

impl BroadcastHub {
    /// Create a new hub
    pub fn new(heartbeat_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            subscribers: RwLock::new(HashMap::new()),
            heartbeat_interval,
            events_sent: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
        })
    }

    /// Register a sink under `subscriber_id`
    ///
    /// An existing subscriber with the same id is replaced; its old sink is
    /// not explicitly closed here, only released. The new subscriber
    /// immediately receives a connection system-message, and its heartbeat
    /// task starts.
    pub async fn attach(self: &Arc<Self>, subscriber_id: SubscriberId, sender: EventSender) {
        let _ = sender
            .try_send(Event::system_message("Connected to scoreboard updates"));

        let heartbeat = self.spawn_heartbeat(subscriber_id.clone());

        let replaced = self
            .subscribers
            .write()
            .await
            .insert(subscriber_id.clone(), Subscriber { sender, heartbeat });

        if let Some(old) = replaced {
            old.heartbeat.abort();
        }

        if is_debug_hub_enabled() {
            logger::debug(
                LogTag::Hub,
                &format!(
                    "subscriber {} attached (active={})",
                    subscriber_id,
                    self.subscribers.read().await.len()
                ),
            );
        }
    }

    /// Remove a subscriber; idempotent for unknown ids
    ///
    /// Dropping the stored sender closes the underlying sink.
    pub async fn detach(&self, subscriber_id: &str) {
        let removed = self.subscribers.write().await.remove(subscriber_id);

        if let Some(subscriber) = removed {
            subscriber.heartbeat.abort();

            if is_debug_hub_enabled() {
                logger::debug(
                    LogTag::Hub,
                    &format!(
                        "subscriber {} detached (active={})",
                        subscriber_id,
                        self.subscribers.read().await.len()
                    ),
                );
            }
        }
    }

    /// Deliver `event` to every currently attached subscriber
    ///
    /// Subscribers whose sink rejects the write are collected and detached
    /// after the fan-out pass - one broken sink never prevents delivery to
    /// the others, and no error reaches the publisher.
    pub async fn publish(&self, event: Event) {
        let mut dead: Vec<SubscriberId> = Vec::new();
        let mut sent = 0u64;
        let mut dropped = 0u64;

        {
            let subscribers = self.subscribers.read().await;
            if subscribers.is_empty() {
                return;
            }

            for (id, subscriber) in subscribers.iter() {
                match subscriber.sender.try_send(event.clone()) {
                    Ok(_) => {
                        sent += 1;
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        // Queue full: drop this event for this subscriber
                        dropped += 1;
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dropped += 1;
                        dead.push(id.clone());
                    }
                }
            }
        }

        self.events_sent.fetch_add(sent, Ordering::Relaxed);
        self.events_dropped.fetch_add(dropped, Ordering::Relaxed);

        for id in &dead {
            self.detach(id).await;
        }

        if is_debug_hub_enabled() {
            logger::debug(
                LogTag::Hub,
                &format!(
                    "broadcast {} (sent={}, dropped={}, pruned={})",
                    event.kind,
                    sent,
                    dropped,
                    dead.len()
                ),
            );
        }
    }

    /// Number of currently attached subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Total events delivered across all subscribers
    pub fn events_sent(&self) -> u64 {
        self.events_sent.load(Ordering::Relaxed)
    }

    /// Total events dropped (full or closed sinks)
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    /// Send a final system-message to every subscriber, close all sinks and
    /// clear subscriber state - used during shutdown
    pub async fn close_all(&self) {
        let mut subscribers = self.subscribers.write().await;

        for (_, subscriber) in subscribers.iter() {
            let _ = subscriber
                .sender
                .try_send(Event::system_message("Server shutting down"));
        }

        for (_, subscriber) in subscribers.drain() {
            subscriber.heartbeat.abort();
        }

        logger::info(LogTag::Hub, "all subscribers closed");
    }

    /// Send one event to a single named subscriber
    ///
    /// A sink that is already closed is reported as a write failure; a full
    /// queue only drops this event (at-most-once delivery).
    async fn send_to(&self, subscriber_id: &str, event: Event) -> Result<(), SinkError> {
        let subscribers = self.subscribers.read().await;

        let subscriber = subscribers.get(subscriber_id).ok_or_else(|| SinkError::Closed {
            subscriber_id: subscriber_id.to_string(),
        })?;

        if subscriber.sender.is_closed() {
            return Err(SinkError::Closed {
                subscriber_id: subscriber_id.to_string(),
            });
        }

        match subscriber.sender.try_send(event) {
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SinkError::Closed {
                subscriber_id: subscriber_id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Per-subscriber keepalive loop
    ///
    /// A subscriber whose sink is already closed when its heartbeat fires is
    /// detached instead of written to.
    fn spawn_heartbeat(self: &Arc<Self>, subscriber_id: SubscriberId) -> JoinHandle<()> {
        let hub = Arc::downgrade(self);
        let interval = self.heartbeat_interval;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let hub = match hub.upgrade() {
                    Some(hub) => hub,
                    None => break,
                };

                if let Err(e) = hub.send_to(&subscriber_id, Event::heartbeat()).await {
                    if is_debug_hub_enabled() {
                        logger::debug(LogTag::Hub, &format!("heartbeat stopped: {}", e));
                    }
                    hub.detach(&subscriber_id).await;
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    fn make_hub() -> Arc<BroadcastHub> {
        BroadcastHub::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_attach_sends_connection_message() {
        let hub = make_hub();
        let (tx, mut rx) = mpsc::channel(8);

        hub.attach("c1".to_string(), tx).await;
        assert_eq!(hub.subscriber_count().await, 1);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::SystemMessage);
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let hub = make_hub();
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);

        hub.attach("c1".to_string(), tx1).await;
        hub.attach("c2".to_string(), tx2).await;

        hub.publish(Event::system_message("hello")).await;

        // Skip each subscriber's connection message
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
        assert_eq!(rx1.recv().await.unwrap().kind, EventKind::SystemMessage);
        assert_eq!(rx2.recv().await.unwrap().kind, EventKind::SystemMessage);
    }

    #[tokio::test]
    async fn test_dead_sink_is_pruned_without_error() {
        let hub = make_hub();
        let (tx, rx) = mpsc::channel(8);

        hub.attach("c1".to_string(), tx).await;
        drop(rx);

        hub.publish(Event::system_message("anyone there?")).await;
        assert_eq!(hub.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_one_broken_sink_does_not_block_others() {
        let hub = make_hub();
        let (tx1, rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);

        hub.attach("dead".to_string(), tx1).await;
        hub.attach("live".to_string(), tx2).await;
        drop(rx1);

        hub.publish(Event::system_message("update")).await;

        rx2.recv().await.unwrap(); // connection message
        assert_eq!(rx2.recv().await.unwrap().kind, EventKind::SystemMessage);
        assert_eq!(hub.subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn test_attach_replaces_existing_id() {
        let hub = make_hub();
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, _rx2) = mpsc::channel(8);

        hub.attach("c1".to_string(), tx1).await;
        hub.attach("c1".to_string(), tx2).await;

        assert_eq!(hub.subscriber_count().await, 1);

        // The replaced sink saw only its own connection message and is now
        // released by the hub
        rx1.recv().await.unwrap();
        assert!(rx1.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_detach_is_idempotent() {
        let hub = make_hub();
        hub.detach("missing").await;
        assert_eq!(hub.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_close_all_sends_final_message_and_clears() {
        let hub = make_hub();
        let (tx, mut rx) = mpsc::channel(8);

        hub.attach("c1".to_string(), tx).await;
        hub.close_all().await;

        assert_eq!(hub.subscriber_count().await, 0);

        rx.recv().await.unwrap(); // connection message
        let last = rx.recv().await.unwrap();
        assert_eq!(last.kind, EventKind::SystemMessage);
        assert!(last.data["message"]
            .as_str()
            .unwrap()
            .contains("shutting down"));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_heartbeat_delivered_on_interval() {
        let hub = BroadcastHub::new(Duration::from_millis(20));
        let (tx, mut rx) = mpsc::channel(8);

        hub.attach("c1".to_string(), tx).await;
        rx.recv().await.unwrap(); // connection message

        let beat = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("heartbeat not delivered in time")
            .unwrap();
        assert_eq!(beat.kind, EventKind::Heartbeat);
    }

    #[tokio::test]
    async fn test_heartbeat_on_closed_sink_detaches() {
        let hub = BroadcastHub::new(Duration::from_millis(20));
        let (tx, rx) = mpsc::channel(8);

        hub.attach("c1".to_string(), tx).await;
        drop(rx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hub.subscriber_count().await, 0);
    }
}

//! Topic-scoped pub/sub delivering stream events to sessions.
//!
//! The transport is a black box to the session controller: anything that can
//! hand out per-topic subscriptions satisfies `EventBus`. `MemoryEventBus` is
//! the in-process implementation for embedders that run the host runtime in
//! the same process (and for tests).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::events::WireEvent;

/// Fixed prefix for per-request stream topics.
pub const STREAM_TOPIC_PREFIX: &str = "claude-stream";

/// Returns the stream topic for a request id.
pub fn stream_topic(request_id: &str) -> String {
    format!("{STREAM_TOPIC_PREFIX}-{request_id}")
}

/// Pub/sub facility keyed by string topic.
pub trait EventBus: Send + Sync {
    /// Subscribes to a topic. Events published after this call are delivered
    /// until the subscription is released.
    fn subscribe(&self, topic: &str) -> Subscription;
}

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Handle to one active topic subscription.
///
/// Owned exclusively by a single session. The release hook runs exactly once:
/// on the first `release()` call, or on drop if the session never released
/// explicitly (including unwinds).
pub struct Subscription {
    events: mpsc::UnboundedReceiver<WireEvent>,
    on_release: Option<ReleaseHook>,
}

impl Subscription {
    pub fn new(events: mpsc::UnboundedReceiver<WireEvent>, on_release: ReleaseHook) -> Self {
        Self {
            events,
            on_release: Some(on_release),
        }
    }

    /// Receives the next event; `None` once the publisher side is gone.
    pub async fn recv(&mut self) -> Option<WireEvent> {
        self.events.recv().await
    }

    /// Stops delivery and runs the release hook. Later calls are no-ops.
    pub fn release(&mut self) {
        self.events.close();
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

type TopicMap = HashMap<String, Vec<mpsc::UnboundedSender<WireEvent>>>;

/// In-process event bus backed by per-topic unbounded channels.
#[derive(Default)]
pub struct MemoryEventBus {
    topics: Arc<Mutex<TopicMap>>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes an event to all live subscribers of a topic. Events published
    /// to a topic with no subscribers are dropped.
    pub fn publish(&self, topic: &str, event: WireEvent) {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(senders) = topics.get_mut(topic) {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
            if senders.is_empty() {
                topics.remove(topic);
            }
        }
    }
}

impl EventBus for MemoryEventBus {
    fn subscribe(&self, topic: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
            topics.entry(topic.to_string()).or_default().push(tx);
        }

        let topics = Arc::clone(&self.topics);
        let topic = topic.to_string();
        Subscription::new(
            rx,
            Box::new(move || {
                // The subscriber's receiver is closed by now; prune its sender.
                let mut topics = topics.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(senders) = topics.get_mut(&topic) {
                    senders.retain(|tx| !tx.is_closed());
                    if senders.is_empty() {
                        topics.remove(&topic);
                    }
                }
            }),
        )
    }
}

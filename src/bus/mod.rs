//! Typed publish/subscribe channel for cross-cutting console notifications.
//!
//! The bus is an explicitly constructed service handle rather than an ambient
//! global: subscribers hold a [`Subscription`] whose drop (or explicit
//! `unsubscribe`) deregisters them deterministically.

use std::sync::Arc;

use chrono::Local;
use flume::{Receiver, Sender};
use parking_lot::Mutex;
use serde::Serialize;

/// Process-wide notifications broadcast by the engines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    /// The active theme changed. `timestamp` is ISO-8601.
    ThemeChanged { theme: String, timestamp: String },
    /// A quick-action trigger fired (e.g. "create-share", "backup-all").
    WidgetAction { action: String, timestamp: String },
}

/// Current local time as an ISO-8601 string, the wire format notifications
/// carry.
pub fn timestamp_now() -> String {
    Local::now().to_rfc3339()
}

struct BusInner {
    subscribers: Vec<(u64, Sender<Notification>)>,
    next_id: u64,
}

/// Cheaply cloneable bus handle; all clones publish to the same subscriber
/// set.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusInner {
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a new subscriber and hand back its receiving end.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = flume::unbounded();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, tx));
        Subscription {
            id,
            rx,
            bus: self.clone(),
        }
    }

    /// Remove a subscriber by id. Dropping the [`Subscription`] calls this.
    pub fn unsubscribe(&self, id: u64) {
        self.inner.lock().subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Broadcast to all live subscribers. Subscribers whose receiving end is
    /// gone are pruned; publishing never fails.
    pub fn publish(&self, notification: Notification) {
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .retain(|(_, tx)| tx.send(notification.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

/// One subscriber's receiving end. Deregisters on drop.
pub struct Subscription {
    id: u64,
    rx: Receiver<Notification>,
    bus: EventBus,
}

impl Subscription {
    pub fn try_recv(&self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Notification> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<Notification> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

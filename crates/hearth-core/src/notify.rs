// ── Push notification bridge ──
//
// Registers the platform push token with the cloud and fans incoming
// events out to listeners. Subscriptions are owned handles: dropping
// one detaches its listener, so a departed caller can never be invoked
// again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

use crate::model::EntityId;

// ── Event and platform types ────────────────────────────────────────

/// Platform the push token was issued by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PushPlatform {
    Apns,
    Fcm,
}

/// A push event delivered by the cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A node's reported state changed.
    NodeChanged { node_id: EntityId },
    /// A node joined or left the account inventory.
    InventoryChanged,
    /// The cloud invalidated the registered push token.
    TokenRevoked,
}

// ── NotificationBridge ──────────────────────────────────────────────

type Listener = Box<dyn Fn(&NotificationEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ListenerId(u64);

/// Fan-out point for cloud push events.
///
/// Cheaply cloneable; all clones share the listener table.
#[derive(Clone)]
pub struct NotificationBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    platform: PushPlatform,
    device_token: String,
    listeners: DashMap<ListenerId, Listener>,
    next_id: AtomicU64,
}

impl NotificationBridge {
    pub fn new(platform: PushPlatform, device_token: impl Into<String>) -> Self {
        let device_token = device_token.into();
        info!(%platform, "push bridge registered");
        Self {
            inner: Arc::new(BridgeInner {
                platform,
                device_token,
                listeners: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn platform(&self) -> PushPlatform {
        self.inner.platform
    }

    /// The raw platform token, for the embedder's cloud registration
    /// call.
    pub fn device_token(&self) -> &str {
        &self.inner.device_token
    }

    /// Attach a listener. It stays registered until the returned
    /// [`Subscription`] is dropped or released.
    pub fn subscribe(
        &self,
        listener: impl Fn(&NotificationEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.insert(id, Box::new(listener));
        debug!(listener_id = id.0, "push listener attached");
        Subscription {
            inner: Arc::clone(&self.inner),
            id: Some(id),
        }
    }

    /// Deliver one event to every live listener.
    pub fn publish(&self, event: &NotificationEvent) {
        for entry in self.inner.listeners.iter() {
            (entry.value())(event);
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

// ── Subscription ────────────────────────────────────────────────────

/// Owned handle for one attached listener.
///
/// Dropping the handle detaches the listener, so events can never
/// reach a caller that has gone away.
pub struct Subscription {
    inner: Arc<BridgeInner>,
    id: Option<ListenerId>,
}

impl Subscription {
    /// Detach explicitly. Equivalent to dropping the handle.
    pub fn release(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.inner.listeners.remove(&id);
            debug!(listener_id = id.0, "push listener detached");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn bridge() -> NotificationBridge {
        NotificationBridge::new(PushPlatform::Fcm, "token-1")
    }

    #[test]
    fn events_reach_live_listeners() {
        let bridge = bridge();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _sub = bridge.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        bridge.publish(&NotificationEvent::InventoryChanged);
        bridge.publish(&NotificationEvent::TokenRevoked);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            [
                NotificationEvent::InventoryChanged,
                NotificationEvent::TokenRevoked
            ]
        );
    }

    #[test]
    fn dropping_subscription_detaches_listener() {
        let bridge = bridge();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let sub = bridge.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        assert_eq!(bridge.listener_count(), 1);

        drop(sub);
        assert_eq!(bridge.listener_count(), 0);

        bridge.publish(&NotificationEvent::InventoryChanged);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn release_is_idempotent_with_drop() {
        let bridge = bridge();
        let sub = bridge.subscribe(|_| {});
        sub.release();
        assert_eq!(bridge.listener_count(), 0);
    }

    #[test]
    fn event_serialization_is_tagged() {
        let event = NotificationEvent::NodeChanged {
            node_id: "node-1".into(),
        };
        let raw = serde_json::to_string(&event).unwrap();
        assert_eq!(raw, r#"{"type":"node_changed","node_id":"node-1"}"#);
    }
}

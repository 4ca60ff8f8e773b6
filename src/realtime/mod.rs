/// Process-local registry of online users and their WebSocket connections.
///
/// State lives only in this process: it is rebuilt from live connections on
/// restart and there is no cross-process coordination. Delivery is
/// fire-and-forget; messages are durably persisted regardless of whether the
/// receiver is online.
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::models::Message;

pub mod session;

/// Events pushed to connected clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    NewMessage { message: Message },
    Notification { kind: String, user_id: Uuid, post_id: Uuid },
}

#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    // user_id -> sender for that user's active connection
    inner: Arc<RwLock<HashMap<Uuid, UnboundedSender<String>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user's connection. A newer connection replaces any
    /// previous one for the same user. Returns the session's own sender
    /// alongside the receiver so the caller can later deregister exactly
    /// this connection, not whatever is current by then.
    pub fn register(&self, user_id: Uuid) -> (UnboundedSender<String>, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let mut guard = self.inner.write().expect("registry lock poisoned");
        guard.insert(user_id, tx.clone());
        tracing::debug!(%user_id, online = guard.len(), "websocket connected");
        (tx, rx)
    }

    /// Remove a user's connection, but only if it is still the one backed by
    /// `sender` — a reconnect may already have replaced it.
    pub fn deregister(&self, user_id: Uuid, sender: &UnboundedSender<String>) {
        let mut guard = self.inner.write().expect("registry lock poisoned");
        if let Some(current) = guard.get(&user_id) {
            if current.same_channel(sender) {
                guard.remove(&user_id);
                tracing::debug!(%user_id, online = guard.len(), "websocket disconnected");
            }
        }
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .contains_key(&user_id)
    }

    /// Push an event to a user if they are connected. Returns whether the
    /// event was handed to a live connection.
    pub fn push(&self, user_id: Uuid, event: &RealtimeEvent) -> bool {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize realtime event");
                return false;
            }
        };

        let guard = self.inner.read().expect("registry lock poisoned");
        match guard.get(&user_id) {
            Some(sender) => sender.send(payload).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_message(sender: Uuid, receiver: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            sender_id: sender,
            receiver_id: receiver,
            content: "hey".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn push_to_offline_user_is_a_noop() {
        let registry = ConnectionRegistry::new();
        let event = RealtimeEvent::Notification {
            kind: "like".to_string(),
            user_id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
        };
        assert!(!registry.push(Uuid::new_v4(), &event));
    }

    #[tokio::test]
    async fn registered_user_receives_pushed_events() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let (_tx, mut rx) = registry.register(user);

        let event = RealtimeEvent::NewMessage {
            message: sample_message(Uuid::new_v4(), user),
        };
        assert!(registry.push(user, &event));

        let payload = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "new_message");
        assert_eq!(value["message"]["content"], "hey");
    }

    #[test]
    fn reconnect_replaces_previous_connection() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();

        let (first, _rx1) = registry.register(user);
        let (second, _rx2) = registry.register(user);

        // Deregistering the stale connection must not evict the new one.
        registry.deregister(user, &first);
        assert!(registry.is_online(user));

        registry.deregister(user, &second);
        assert!(!registry.is_online(user));
    }

    #[tokio::test]
    async fn stale_session_shutdown_keeps_replacement_reachable() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();

        // First session connects, then a second one replaces it before the
        // first has finished starting up. Each session holds the sender
        // handed out by its own register call.
        let (first, _rx1) = registry.register(user);
        let (_second, mut rx2) = registry.register(user);

        // The first session shutting down must not take the live
        // replacement connection with it.
        registry.deregister(user, &first);
        assert!(registry.is_online(user));

        let event = RealtimeEvent::NewMessage {
            message: sample_message(Uuid::new_v4(), user),
        };
        assert!(registry.push(user, &event));
        assert!(rx2.recv().await.is_some());
    }
}

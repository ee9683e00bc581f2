//! Connection registry for live notification streams.
//!
//! Tracks the single live connection per user, with heartbeat-based
//! eviction. This is the only shared mutable state in the core: stream
//! opens, closes, pings, sends, and the reaper all mutate the map
//! concurrently, so every map operation happens inside one mutex
//! critical section — and the lock is never held across an await
//! (writer handles are cloned `Arc`s, I/O happens after release).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::delivery::PushDeliveryAdapter;
use crate::model::{Notification, PushSubscription};

/// A stream write failure, as reported by the transport.
#[derive(Debug, Error)]
#[error("stream write failed: {0}")]
pub struct StreamError(pub String);

/// The outbound stream primitive, supplied by the transport layer.
///
/// One writer per connected client. The registry is the sole owner of
/// writer handles; no other component may hold one.
#[async_trait::async_trait]
pub trait StreamWriter: Send + Sync {
    /// Write one serialized payload to the client.
    async fn send(&self, payload: &[u8]) -> Result<(), StreamError>;

    /// Close the stream. Errors are swallowed by the registry.
    async fn close(&self) -> Result<(), StreamError>;
}

/// Why a send through the registry failed.
#[derive(Debug, Error)]
pub enum SendError {
    /// The user has no live connection. Normal during broadcast; the
    /// push channel covers these recipients.
    #[error("user has no live connection")]
    NotConnected,

    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Write(#[from] StreamError),
}

/// One live connection: absent → live on open, live → absent on explicit
/// close, write failure, or heartbeat timeout. No intermediate states.
struct Connection {
    writer: Arc<dyn StreamWriter>,
    last_ping: Instant,
    /// Client-registered push subscription, cached so stream delivery
    /// can mirror to push without a store read. Survives reconnects.
    push_subscription: Option<PushSubscription>,
}

/// Registry of live connections, one per user.
///
/// Explicitly constructed and injected by the embedding application —
/// never a hidden global — so tests can run isolated instances.
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, Connection>>,
    push: Arc<PushDeliveryAdapter>,
    timeout: Duration,
}

impl ConnectionRegistry {
    /// Create a registry with the given heartbeat timeout.
    pub fn new(push: Arc<PushDeliveryAdapter>, timeout: Duration) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            push,
            timeout,
        }
    }

    /// Register or replace the connection for a user.
    ///
    /// Replacement preserves the cached push subscription and abandons
    /// the old writer without closing it: the transport layer closes
    /// superseded streams itself, and the client has already moved on.
    pub fn add_connection(&self, user_id: &str, writer: Arc<dyn StreamWriter>) {
        let mut connections = self.connections.lock().expect("registry lock poisoned");
        let cached = connections
            .remove(user_id)
            .and_then(|old| old.push_subscription);
        if cached.is_some() {
            tracing::debug!(user_id, "Replacing live connection, keeping cached subscription");
        }
        connections.insert(
            user_id.to_string(),
            Connection {
                writer,
                last_ping: Instant::now(),
                push_subscription: cached,
            },
        );
    }

    /// Attach or overwrite the cached push subscription on a live
    /// connection. Silently a no-op without one — users with no live
    /// connection are served from the persisted store instead.
    pub fn add_push_subscription(&self, user_id: &str, subscription: PushSubscription) {
        let mut connections = self.connections.lock().expect("registry lock poisoned");
        if let Some(connection) = connections.get_mut(user_id) {
            connection.push_subscription = Some(subscription);
        }
    }

    /// Close and remove a user's connection.
    ///
    /// The map entry is detached first, so a failing close can never
    /// leak registry state; close errors are swallowed.
    pub async fn remove_connection(&self, user_id: &str) {
        let removed = {
            let mut connections = self.connections.lock().expect("registry lock poisoned");
            connections.remove(user_id)
        };
        if let Some(connection) = removed {
            if let Err(e) = connection.writer.close().await {
                tracing::debug!(user_id, error = %e, "Ignoring close failure on removal");
            }
        }
    }

    /// Send a notification to a user's live stream.
    ///
    /// On success the connection's ping is refreshed; on write failure
    /// the connection is removed and the error returned. If a push
    /// subscription is cached, delivery is mirrored to it best-effort,
    /// independent of the stream outcome.
    pub async fn send_notification(
        &self,
        user_id: &str,
        notification: &Notification,
    ) -> Result<(), SendError> {
        let (writer, cached) = {
            let connections = self.connections.lock().expect("registry lock poisoned");
            match connections.get(user_id) {
                Some(connection) => (
                    connection.writer.clone(),
                    connection.push_subscription.clone(),
                ),
                None => return Err(SendError::NotConnected),
            }
        };

        let payload = notification.payload().encode()?;
        let result = writer.send(&payload).await;

        match &result {
            Ok(()) => {
                let mut connections = self.connections.lock().expect("registry lock poisoned");
                if let Some(connection) = connections.get_mut(user_id) {
                    connection.last_ping = Instant::now();
                }
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Stream write failed, removing connection");
                self.remove_connection(user_id).await;
            }
        }

        if let Some(subscription) = cached {
            self.push.deliver_to_subscription(&subscription, &payload).await;
        }

        result.map_err(SendError::from)
    }

    /// Client keepalive. Driven by untrusted traffic, so an unknown user
    /// is a warn-logged no-op, never an error.
    pub fn update_ping(&self, user_id: &str) {
        let mut connections = self.connections.lock().expect("registry lock poisoned");
        match connections.get_mut(user_id) {
            Some(connection) => connection.last_ping = Instant::now(),
            None => tracing::warn!(user_id, "Ping for unknown connection"),
        }
    }

    /// Evict every connection whose last ping is older than the timeout.
    ///
    /// Returns the number of evicted connections. Per-connection close
    /// failures are swallowed so one bad connection cannot block the rest.
    pub async fn reap_stale(&self) -> usize {
        let stale: Vec<String> = {
            let connections = self.connections.lock().expect("registry lock poisoned");
            connections
                .iter()
                .filter(|(_, c)| c.last_ping.elapsed() > self.timeout)
                .map(|(user_id, _)| user_id.clone())
                .collect()
        };

        for user_id in &stale {
            tracing::info!(user_id, "Evicting stale connection (heartbeat timeout)");
            self.remove_connection(user_id).await;
        }
        stale.len()
    }

    /// Spawn the recurring heartbeat reaper task.
    pub fn spawn_reaper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately; skip it so a fresh
            // registry isn't scanned before anyone could ping.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = self.reap_stale().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "Heartbeat reaper pass complete");
                }
            }
        })
    }

    /// Number of live connections.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.connections.lock().expect("registry lock poisoned").len()
    }

    /// IDs of all connected users.
    #[must_use]
    pub fn connected_users(&self) -> Vec<String> {
        self.connections
            .lock()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubscriptionKeys;
    use crate::storage::PushSubscriptionStore;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct NullWriter {
        closed: AtomicBool,
    }

    impl NullWriter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                closed: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl StreamWriter for NullWriter {
        async fn send(&self, _payload: &[u8]) -> Result<(), StreamError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), StreamError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct EmptyStore;

    #[async_trait]
    impl PushSubscriptionStore for EmptyStore {
        async fn find_by_user(&self, _user_id: &str) -> Result<Vec<PushSubscription>> {
            Ok(vec![])
        }

        async fn delete(&self, _endpoint: &str) -> Result<()> {
            Ok(())
        }
    }

    struct NullTransport;

    #[async_trait]
    impl crate::delivery::PushTransport for NullTransport {
        async fn send(
            &self,
            _subscription: &PushSubscription,
            _payload: &[u8],
        ) -> Result<(), crate::delivery::PushError> {
            Ok(())
        }
    }

    fn test_registry() -> ConnectionRegistry {
        let adapter =
            PushDeliveryAdapter::new(Arc::new(EmptyStore), Arc::new(NullTransport));
        ConnectionRegistry::new(Arc::new(adapter), Duration::from_secs(90))
    }

    fn subscription(user_id: &str) -> PushSubscription {
        PushSubscription {
            endpoint: format!("https://push.example/{user_id}"),
            keys: SubscriptionKeys {
                p256dh: "key".into(),
                auth: "auth".into(),
            },
            expiration_time: None,
            user_id: user_id.into(),
        }
    }

    #[tokio::test]
    async fn test_add_remove_leaves_registry_empty() {
        let registry = test_registry();
        let writer = NullWriter::new();

        registry.add_connection("reader-1", writer.clone());
        assert_eq!(registry.active_count(), 1);

        registry.remove_connection("reader-1").await;
        assert_eq!(registry.active_count(), 0);
        assert!(writer.closed.load(Ordering::SeqCst), "removal should close the writer");
    }

    #[tokio::test]
    async fn test_replacement_preserves_cached_subscription() {
        let registry = test_registry();
        let old_writer = NullWriter::new();

        registry.add_connection("reader-1", old_writer.clone());
        registry.add_push_subscription("reader-1", subscription("reader-1"));

        // Reconnect with a fresh writer
        registry.add_connection("reader-1", NullWriter::new());
        assert_eq!(registry.active_count(), 1);

        // The old writer is abandoned, not closed
        assert!(!old_writer.closed.load(Ordering::SeqCst));

        let connections = registry.connections.lock().unwrap();
        let cached = &connections["reader-1"].push_subscription;
        assert!(cached.is_some(), "cached subscription should survive reconnect");
    }

    #[tokio::test]
    async fn test_subscription_for_unknown_user_is_noop() {
        let registry = test_registry();
        registry.add_push_subscription("ghost", subscription("ghost"));
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_ping_for_unknown_user_does_not_panic() {
        let registry = test_registry();
        registry.update_ping("ghost");
    }

    #[tokio::test]
    async fn test_remove_unknown_user_is_noop() {
        let registry = test_registry();
        registry.remove_connection("ghost").await;
        assert_eq!(registry.active_count(), 0);
    }
}

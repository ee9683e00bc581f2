//! The facade the embedding application wires up at startup.
//!
//! Owns the connection registry, push adapter, and broadcaster, and
//! exposes the operations the surrounding platform calls into:
//! content-creation scoring, the scheduled trending broadcast, and the
//! stream transport callbacks (connect, disconnect, subscription
//! registration, keepalive).

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::broadcast::{BroadcastOutcome, Broadcaster};
use crate::config::Config;
use crate::delivery::{PushDeliveryAdapter, PushTransport};
use crate::model::{ContentItem, PushSubscription};
use crate::registry::{ConnectionRegistry, StreamWriter};
use crate::scoring::{self, ScoreAssignment};
use crate::storage::{ContentStore, NotificationStore, PushSubscriptionStore, UserDirectory};

/// The ranking/delivery core, dependency-injected and test-isolated.
///
/// Construct one per process at startup; multiple isolated instances are
/// fine in tests.
pub struct NotifyService {
    config: Config,
    content: Arc<dyn ContentStore>,
    registry: Arc<ConnectionRegistry>,
    broadcaster: Broadcaster,
}

impl NotifyService {
    pub fn new(
        config: Config,
        content: Arc<dyn ContentStore>,
        notifications: Arc<dyn NotificationStore>,
        subscriptions: Arc<dyn PushSubscriptionStore>,
        users: Arc<dyn UserDirectory>,
        push_transport: Arc<dyn PushTransport>,
    ) -> Self {
        let push = Arc::new(PushDeliveryAdapter::new(subscriptions, push_transport));
        let registry = Arc::new(ConnectionRegistry::new(
            push.clone(),
            config.heartbeat_timeout(),
        ));
        let broadcaster = Broadcaster::new(
            content.clone(),
            notifications,
            users,
            registry.clone(),
            push,
            config.trending_window(),
            config.excerpt_max_chars,
        );
        Self {
            config,
            content,
            registry,
            broadcaster,
        }
    }

    /// Score a new content item. Must be called synchronously before the
    /// item is persisted; a failure here fails the creation atomically.
    pub async fn on_content_created(&self, item: &ContentItem) -> Result<ScoreAssignment> {
        scoring::compute_initial_score(self.content.as_ref(), item, Utc::now()).await
    }

    /// Run one trending broadcast, invoked by the external scheduler.
    pub async fn run_trending_broadcast(&self) -> Result<BroadcastOutcome> {
        self.broadcaster.run().await
    }

    /// Stream transport callback: a client opened its stream.
    pub fn open_connection(&self, user_id: &str, writer: Arc<dyn StreamWriter>) {
        self.registry.add_connection(user_id, writer);
    }

    /// Stream transport callback: a client closed its stream.
    pub async fn close_connection(&self, user_id: &str) {
        self.registry.remove_connection(user_id).await;
    }

    /// A client registered for push; caches the subscription on its live
    /// connection (persisting it is the registration endpoint's job).
    pub fn register_push_subscription(&self, user_id: &str, subscription: PushSubscription) {
        self.registry.add_push_subscription(user_id, subscription);
    }

    /// Client keepalive signal.
    pub fn ping(&self, user_id: &str) {
        self.registry.update_ping(user_id);
    }

    /// Spawn the heartbeat reaper on the configured interval.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        self.registry
            .clone()
            .spawn_reaper(self.config.heartbeat_interval())
    }

    /// The connection registry, for the transport layer and tests.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}

//! Test harness for the Presswire contract tests.
//!
//! Provides:
//! - In-memory collaborator stores
//! - Recording stream writers and scripted push transports
//! - Fixture builders for content items and subscriptions

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use presswire::delivery::{PushError, PushTransport};
use presswire::model::{
    ContentItem, Notification, PushSubscription, SourceType, SubscriptionKeys,
};
use presswire::registry::{StreamError, StreamWriter};
use presswire::storage::{
    ContentStore, NotificationStore, PushSubscriptionStore, UserDirectory,
};

/// In-memory content store backed by a vector of items.
#[derive(Default)]
pub struct MemoryContentStore {
    pub items: Mutex<Vec<ContentItem>>,
}

impl MemoryContentStore {
    pub fn with_items(items: Vec<ContentItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn find_recent_content_keywords(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<HashSet<String>>> {
        let mut items: Vec<ContentItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.published_at >= since)
            .cloned()
            .collect();
        // Deterministic order, as the real projection query guarantees
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items.into_iter().map(|item| item.keywords).collect())
    }

    async fn find_trending_candidate(
        &self,
        since: DateTime<Utc>,
        source_type: SourceType,
    ) -> Result<Option<ContentItem>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.published_at >= since && item.source_type == source_type)
            .max_by_key(|item| item.prominence_score)
            .cloned())
    }
}

/// In-memory notification store that can be scripted to fail for
/// specific recipients.
#[derive(Default)]
pub struct MemoryNotificationStore {
    pub persisted: Mutex<Vec<Notification>>,
    pub fail_for: Mutex<HashSet<String>>,
}

impl MemoryNotificationStore {
    pub fn fail_for_recipient(&self, recipient: &str) {
        self.fail_for.lock().unwrap().insert(recipient.to_string());
    }

    pub fn persisted_for(&self, recipient: &str) -> Vec<Notification> {
        self.persisted
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect()
    }

    pub fn persisted_ids(&self) -> HashSet<String> {
        self.persisted
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.id.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn persist(&self, notification: Notification) -> Result<Notification> {
        if self.fail_for.lock().unwrap().contains(&notification.recipient) {
            return Err(anyhow!("simulated persist failure"));
        }
        self.persisted.lock().unwrap().push(notification.clone());
        Ok(notification)
    }
}

/// In-memory push subscription store.
#[derive(Default)]
pub struct MemoryPushStore {
    pub subscriptions: Mutex<Vec<PushSubscription>>,
}

impl MemoryPushStore {
    pub fn with_subscriptions(subscriptions: Vec<PushSubscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions),
        }
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.endpoint.clone())
            .collect()
    }
}

#[async_trait]
impl PushSubscriptionStore for MemoryPushStore {
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<PushSubscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, endpoint: &str) -> Result<()> {
        self.subscriptions
            .lock()
            .unwrap()
            .retain(|s| s.endpoint != endpoint);
        Ok(())
    }
}

/// Fixed list of active users.
pub struct StaticUsers(pub Vec<String>);

#[async_trait]
impl UserDirectory for StaticUsers {
    async fn active_user_ids(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Stream writer that records every payload; can be scripted to fail
/// writes or closes.
#[derive(Default)]
pub struct RecordingWriter {
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub fail_writes: AtomicBool,
    pub fail_close: AtomicBool,
    pub closed: AtomicBool,
}

impl RecordingWriter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let writer = Self::default();
        writer.fail_writes.store(true, Ordering::SeqCst);
        Arc::new(writer)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_payloads(&self) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).expect("payload is JSON"))
            .collect()
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamWriter for RecordingWriter {
    async fn send(&self, payload: &[u8]) -> Result<(), StreamError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StreamError("connection reset".into()));
        }
        self.sent.lock().unwrap().push(payload.to_vec());
        Ok(())
    }

    async fn close(&self) -> Result<(), StreamError> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(StreamError("close failed".into()));
        }
        Ok(())
    }
}

/// Push transport that records attempted endpoints; endpoints can be
/// scripted to report gone or to fail transiently.
#[derive(Default)]
pub struct ScriptedPushTransport {
    pub attempted: Mutex<Vec<String>>,
    pub gone_endpoints: Mutex<HashSet<String>>,
    pub failing_endpoints: Mutex<HashSet<String>>,
}

impl ScriptedPushTransport {
    pub fn mark_gone(&self, endpoint: &str) {
        self.gone_endpoints.lock().unwrap().insert(endpoint.to_string());
    }

    pub fn mark_failing(&self, endpoint: &str) {
        self.failing_endpoints
            .lock()
            .unwrap()
            .insert(endpoint.to_string());
    }

    pub fn attempted_endpoints(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for ScriptedPushTransport {
    async fn send(
        &self,
        subscription: &PushSubscription,
        _payload: &[u8],
    ) -> Result<(), PushError> {
        self.attempted
            .lock()
            .unwrap()
            .push(subscription.endpoint.clone());
        if self
            .gone_endpoints
            .lock()
            .unwrap()
            .contains(&subscription.endpoint)
        {
            return Err(PushError::Gone);
        }
        if self
            .failing_endpoints
            .lock()
            .unwrap()
            .contains(&subscription.endpoint)
        {
            return Err(PushError::Transport("503 service unavailable".into()));
        }
        Ok(())
    }
}

/// Build a content item published `hours_ago` hours before now.
pub fn make_item(id: &str, source_type: SourceType, hours_ago: i64, prominence: i64) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        slug: format!("{id}-slug"),
        title: format!("Title for {id}"),
        content: format!("<p>Body of {id}.</p>"),
        keywords: HashSet::new(),
        categories: HashSet::new(),
        image_url: None,
        source_type,
        published_at: Utc::now() - chrono::Duration::hours(hours_ago),
        initial_score: prominence,
        prominence_score: prominence,
    }
}

/// Build a push subscription for a user.
pub fn make_subscription(user_id: &str, endpoint: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.to_string(),
        keys: SubscriptionKeys {
            p256dh: "p256dh-key".into(),
            auth: "auth-secret".into(),
        },
        expiration_time: None,
        user_id: user_id.to_string(),
    }
}

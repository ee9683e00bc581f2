//! Collaborator store traits.
//!
//! The content, notification, and push-subscription stores (and the
//! active-user lookup) are owned by the embedding application. All
//! methods are async so sync and native-async backends alike fit behind
//! one interface; errors surface as `anyhow::Error` since the core
//! treats any backend failure opaquely.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::model::{ContentItem, Notification, PushSubscription, SourceType};

/// Read access to the content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Keyword sets of all items published at or after `since`.
    ///
    /// Projection: keywords only — this backs the novelty check and runs
    /// on every content creation. The result order must be deterministic
    /// for identical data.
    async fn find_recent_content_keywords(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<HashSet<String>>>;

    /// The active item with the highest stored prominence score published
    /// at or after `since`, filtered to the given source type.
    ///
    /// The stored score is authoritative; callers do not recompute it.
    async fn find_trending_candidate(
        &self,
        since: DateTime<Utc>,
        source_type: SourceType,
    ) -> Result<Option<ContentItem>>;
}

/// Write access to the notification store.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a notification, returning the stored record.
    async fn persist(&self, notification: Notification) -> Result<Notification>;
}

/// Access to the persisted push registrations.
#[async_trait]
pub trait PushSubscriptionStore: Send + Sync {
    /// All registrations for one user.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<PushSubscription>>;

    /// Delete one registration by its unique endpoint.
    async fn delete(&self, endpoint: &str) -> Result<()>;
}

/// Lookup of users eligible for broadcast.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// IDs of all currently active users.
    async fn active_user_ids(&self) -> Result<Vec<String>>;
}

//! Notification construction and persistence.
//!
//! System-generated trending notifications: no actors, NORMAL priority,
//! unread and unarchived. No dedup key — repeated broadcasts of the same
//! item produce duplicate records (a product decision still pending, see
//! DESIGN.md).

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::generate_notification_id;
use crate::model::{
    ContentItem, Notification, NotificationContent, NotificationStatus, NotificationTarget,
    Priority,
};
use crate::scoring::excerpt;
use crate::storage::NotificationStore;

/// Notification type for everything this core produces.
pub const KIND_RECOMMENDATION: &str = "RECOMMENDATION";

/// Subtype for trending-content recommendations.
pub const SUBTYPE_TRENDING: &str = "TRENDING_CONTENT";

/// Build an unpersisted trending notification for one recipient.
pub fn build_notification(
    recipient: &str,
    item: &ContentItem,
    now: DateTime<Utc>,
    excerpt_max_chars: usize,
) -> Notification {
    Notification {
        id: generate_notification_id(),
        recipient: recipient.to_string(),
        kind: KIND_RECOMMENDATION.into(),
        subtype: SUBTYPE_TRENDING.into(),
        actors: vec![],
        target: NotificationTarget {
            content_id: item.id.clone(),
            slug: item.slug.clone(),
        },
        content: NotificationContent {
            title: item.title.clone(),
            body: excerpt(&item.content, excerpt_max_chars),
            thumbnail: item.image_url.clone(),
            url: Some(format!("/posts/{}", item.slug)),
        },
        status: NotificationStatus::default(),
        priority: Priority::Normal,
        created_at: now,
    }
}

/// Build and persist a trending notification, returning the stored record.
pub async fn create_notification(
    store: &dyn NotificationStore,
    recipient: &str,
    item: &ContentItem,
    now: DateTime<Utc>,
    excerpt_max_chars: usize,
) -> Result<Notification> {
    let notification = build_notification(recipient, item, now, excerpt_max_chars);
    store.persist(notification).await
}

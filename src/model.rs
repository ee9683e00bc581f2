//! Domain records for the ranking and delivery core.
//!
//! The content, notification, and subscription stores own their records;
//! these types are the shared shapes read and written at the boundary,
//! plus the serialized payload sent over live streams and push endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a content item entered the platform.
///
/// User-authored content scores higher and decays slower than
/// auto-ingested content. An absent source type falls into the
/// `Auto` bucket for both tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Authored by a human editor or contributor.
    User,
    /// Ingested automatically (feeds, syndication).
    #[default]
    Auto,
}

/// A published content item, as read from the content store.
///
/// The core only ever writes the two score fields. `initial_score` is
/// assigned exactly once at creation; `prominence_score` is a cached
/// value that must always be reproducible from `initial_score`,
/// `published_at`, `source_type`, and the current time via
/// [`crate::scoring::recalculate_prominence`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub slug: String,
    pub title: String,
    /// HTML body.
    pub content: String,
    pub keywords: HashSet<String>,
    pub categories: HashSet<String>,
    /// Featured image, distinct from inline `<img>` tags in the body.
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_type: SourceType,
    pub published_at: DateTime<Utc>,
    pub initial_score: i64,
    pub prominence_score: i64,
}

/// Notification urgency, rendered by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

/// What the notification points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTarget {
    pub content_id: String,
    pub slug: String,
}

/// The human-readable part of a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Read/archive flags, mutated by the reader-facing API (out of scope here).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStatus {
    pub is_read: bool,
    pub is_archived: bool,
}

/// A persisted notification record.
///
/// Created once by the notification factory; this core never mutates or
/// deletes it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub recipient: String,
    /// Fixed to "RECOMMENDATION" for everything this core produces.
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: String,
    /// Empty for system-generated notifications.
    pub actors: Vec<String>,
    pub target: NotificationTarget,
    pub content: NotificationContent,
    pub status: NotificationStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build the wire payload sent to streams and push endpoints.
    pub fn payload(&self) -> StreamPayload {
        StreamPayload {
            id: self.id.clone(),
            title: self.content.title.clone(),
            body: self.content.body.clone(),
            thumbnail: self.content.thumbnail.clone(),
            url: self.content.url.clone(),
            slug: self.target.slug.clone(),
            priority: self.priority,
        }
    }
}

/// The JSON shape delivered to clients.
///
/// Identical for the live stream and the push channel: the notification
/// content fields plus `id` and the target's slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamPayload {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub slug: String,
    pub priority: Priority,
}

impl StreamPayload {
    /// Serialize to the bytes handed to the transports.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Encryption keys for one browser push registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser push registration, as persisted by the subscription store.
///
/// Created by client registration (out of scope); deleted by the push
/// delivery adapter when a delivery attempt reports the endpoint gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Unique per registration.
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    #[serde(rename = "expirationTime", skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<i64>,
    pub user_id: String,
}

//! Presswire: content prominence ranking and real-time notification fan-out.
//!
//! Presswire is the ranking/delivery core of a news publishing platform.
//! It scores published content, selects the current trending item, and
//! fans notifications out to connected readers over their live streams,
//! with browser push as the best-effort fallback channel.
//!
//! # Architecture
//!
//! - **At-Most-Once Delivery**: no retry queue, no redelivery — a
//!   notification is persisted first, then delivered best-effort
//! - **Injected Collaborators**: content, notification, and subscription
//!   stores plus the stream/push transports are traits supplied by the
//!   embedding application
//! - **Single Registry**: all live connections are owned by one
//!   mutex-guarded registry with heartbeat-based eviction
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`model`]: domain records and the serialized wire payload
//! - [`scoring`]: initial scoring, novelty penalty, prominence decay
//! - [`storage`]: collaborator store traits
//! - [`registry`]: live connection registry and heartbeat reaper
//! - [`delivery`]: push delivery adapter
//! - [`broadcast`]: trending selection, notification factory, fan-out
//! - [`service`]: the facade wired up by the embedding application
//! - [`observability`]: tracing setup

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,  // registry::ConnectionRegistry is fine
    clippy::must_use_candidate,       // Not all functions need #[must_use]
    clippy::missing_errors_doc,       // Error docs can be verbose
    clippy::missing_panics_doc,       // Panic docs can be verbose
    clippy::cast_possible_truncation, // Score rounding is intentional
    clippy::cast_precision_loss,      // Scores fit comfortably in f64
    clippy::struct_excessive_bools    // Status structs may have flags
)]

pub mod broadcast;
pub mod config;
pub mod delivery;
pub mod model;
pub mod observability;
pub mod registry;
pub mod scoring;
pub mod service;
pub mod storage;

use uuid::Uuid;

/// Generate a new UUIDv7 (time-sortable) notification ID.
///
/// UUIDv7 provides time-sortable IDs that enable efficient range queries
/// and natural ordering by creation time.
///
/// # Example
///
/// ```
/// let id = presswire::generate_notification_id();
/// assert!(id.len() == 36); // UUID string format
/// ```
#[must_use]
pub fn generate_notification_id() -> String {
    Uuid::now_v7().to_string()
}

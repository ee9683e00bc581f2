//! The broadcast orchestrator.
//!
//! Ties the selector, factory, registry, and push adapter together: for
//! each active recipient, persist a notification, deliver it over the
//! live stream, then over push. Per-recipient failures are logged and
//! skipped — partial delivery is the expected steady state, so the job
//! reports success even when individual recipients failed.

pub mod factory;
pub mod selector;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::registry::{ConnectionRegistry, SendError};
use crate::delivery::PushDeliveryAdapter;
use crate::storage::{ContentStore, NotificationStore, UserDirectory};

/// Result of one trending broadcast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// No candidate in the window; the run was a no-op, not an error.
    NoCandidate,
    /// Fan-out ran. `notified` counts recipients whose notification was
    /// persisted; `failed` counts recipients skipped on persist failure.
    Completed { notified: usize, failed: usize },
}

/// Runs the trending fan-out against the injected collaborators.
pub struct Broadcaster {
    content: Arc<dyn ContentStore>,
    notifications: Arc<dyn NotificationStore>,
    users: Arc<dyn UserDirectory>,
    registry: Arc<ConnectionRegistry>,
    push: Arc<PushDeliveryAdapter>,
    window: chrono::Duration,
    excerpt_max_chars: usize,
}

impl Broadcaster {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        content: Arc<dyn ContentStore>,
        notifications: Arc<dyn NotificationStore>,
        users: Arc<dyn UserDirectory>,
        registry: Arc<ConnectionRegistry>,
        push: Arc<PushDeliveryAdapter>,
        window: chrono::Duration,
        excerpt_max_chars: usize,
    ) -> Self {
        Self {
            content,
            notifications,
            users,
            registry,
            push,
            window,
            excerpt_max_chars,
        }
    }

    /// Run one trending broadcast at the current time.
    pub async fn run(&self) -> Result<BroadcastOutcome> {
        self.run_at(Utc::now()).await
    }

    /// Run one trending broadcast at an explicit instant.
    ///
    /// Errors only on the selection or recipient queries; everything
    /// past that point is per-recipient and never aborts the loop.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<BroadcastOutcome> {
        let Some(item) = selector::select_trending(self.content.as_ref(), self.window, now).await?
        else {
            tracing::info!("Trending broadcast: no candidate in window");
            return Ok(BroadcastOutcome::NoCandidate);
        };

        let recipients = self.users.active_user_ids().await?;
        tracing::info!(
            content_id = %item.id,
            recipients = recipients.len(),
            "Starting trending broadcast"
        );

        let mut notified = 0;
        let mut failed = 0;

        for recipient in &recipients {
            // Persist first, so a client that immediately fetches its
            // notification history by id will find the record.
            let notification = match factory::create_notification(
                self.notifications.as_ref(),
                recipient,
                &item,
                now,
                self.excerpt_max_chars,
            )
            .await
            {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(
                        recipient,
                        error = %e,
                        "Skipping recipient: notification persist failed"
                    );
                    failed += 1;
                    continue;
                }
            };
            notified += 1;

            match self.registry.send_notification(recipient, &notification).await {
                Ok(()) => {}
                Err(SendError::NotConnected) => {
                    // Normal: push is the only channel for offline readers.
                }
                Err(e) => {
                    tracing::debug!(recipient, error = %e, "Stream delivery failed");
                }
            }

            match notification.payload().encode() {
                Ok(payload) => {
                    self.push.deliver_to_user(recipient, &payload).await;
                }
                Err(e) => {
                    tracing::warn!(recipient, error = %e, "Push payload serialization failed");
                }
            }
        }

        tracing::info!(content_id = %item.id, notified, failed, "Trending broadcast complete");
        Ok(BroadcastOutcome::Completed { notified, failed })
    }
}

//! Browser push delivery with stale-endpoint pruning.
//!
//! Push is the best-effort fallback channel: no retry, no backoff, and
//! nothing here may fail or block a broadcast. The one state change is
//! self-healing — an endpoint that reports itself gone is deleted from
//! the subscription store.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::model::PushSubscription;
use crate::storage::PushSubscriptionStore;

/// A push delivery failure, as reported by the transport.
#[derive(Debug, Error)]
pub enum PushError {
    /// The endpoint is permanently invalid (the HTTP 410 case) and its
    /// subscription should be deleted.
    #[error("push endpoint gone")]
    Gone,

    /// Any other delivery failure; logged and otherwise ignored.
    #[error("push delivery failed: {0}")]
    Transport(String),
}

/// The outbound push primitive, supplied by the embedding application.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Deliver a payload to one push endpoint.
    async fn send(&self, subscription: &PushSubscription, payload: &[u8])
        -> Result<(), PushError>;
}

/// Fans a payload out to a user's registered push endpoints.
#[derive(Clone)]
pub struct PushDeliveryAdapter {
    subscriptions: Arc<dyn PushSubscriptionStore>,
    transport: Arc<dyn PushTransport>,
}

impl PushDeliveryAdapter {
    pub fn new(
        subscriptions: Arc<dyn PushSubscriptionStore>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        Self {
            subscriptions,
            transport,
        }
    }

    /// Deliver a payload to every persisted subscription for a user.
    ///
    /// Entirely best-effort: store and transport failures are logged and
    /// swallowed. Returns the number of successful deliveries.
    pub async fn deliver_to_user(&self, user_id: &str, payload: &[u8]) -> usize {
        let subscriptions = match self.subscriptions.find_by_user(user_id).await {
            Ok(subs) => subs,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load push subscriptions");
                return 0;
            }
        };

        let mut delivered = 0;
        for subscription in &subscriptions {
            if self.deliver_to_subscription(subscription, payload).await {
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver a payload to a single subscription, pruning it if gone.
    ///
    /// Returns whether the delivery succeeded.
    pub async fn deliver_to_subscription(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> bool {
        match self.transport.send(subscription, payload).await {
            Ok(()) => true,
            Err(PushError::Gone) => {
                tracing::info!(
                    user_id = %subscription.user_id,
                    endpoint = %subscription.endpoint,
                    "Push endpoint gone, deleting subscription"
                );
                if let Err(e) = self.subscriptions.delete(&subscription.endpoint).await {
                    tracing::warn!(
                        endpoint = %subscription.endpoint,
                        error = %e,
                        "Failed to delete stale push subscription"
                    );
                }
                false
            }
            Err(PushError::Transport(reason)) => {
                tracing::warn!(
                    user_id = %subscription.user_id,
                    endpoint = %subscription.endpoint,
                    reason,
                    "Push delivery failed"
                );
                false
            }
        }
    }
}

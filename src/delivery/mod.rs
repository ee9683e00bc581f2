//! Outbound delivery adapters.

pub mod push;

pub use push::{PushDeliveryAdapter, PushError, PushTransport};

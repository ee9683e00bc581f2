//! Logging infrastructure.
//!
//! Structured tracing setup for the embedding application and tests.

pub mod tracing;

//! Exponential prominence decay.
//!
//! Pure, no I/O. The stored prominence score must always be reproducible
//! by this function from the immutable initial score, publication time,
//! and source type.

use chrono::{DateTime, Utc};

use crate::model::SourceType;

/// Per-hour decay constants by source type.
///
/// Auto-ingested content decays faster than user-authored content; a
/// deployment-tunable table.
pub fn decay_constant(source_type: SourceType) -> f64 {
    match source_type {
        SourceType::User => 0.05,
        SourceType::Auto => 0.10,
    }
}

/// Recompute the prominence score at `now`.
///
/// `prominence = round(initial * exp(-k * hours))`, with fractional
/// hours since publication. A `published_at` in the future (scheduled,
/// then backfilled) returns the initial score unchanged. Monotonically
/// non-increasing in elapsed time; can reach 0 but never goes negative
/// since `exp(..) ∈ (0, 1]`.
pub fn recalculate_prominence(
    initial_score: i64,
    published_at: DateTime<Utc>,
    source_type: SourceType,
    now: DateTime<Utc>,
) -> i64 {
    let hours = (now - published_at).num_milliseconds() as f64 / 3_600_000.0;
    if hours < 0.0 {
        return initial_score;
    }
    let k = decay_constant(source_type);
    (initial_score as f64 * (-k * hours).exp()).round() as i64
}

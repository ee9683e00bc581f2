//! The scoring engine.
//!
//! Two entry points:
//! - [`compute_initial_score`]: invoked once, synchronously, before a new
//!   content item is persisted. Combines a per-source base score with a
//!   multiplicative richness factor and a novelty penalty (the one
//!   database-dependent step).
//! - [`recalculate_prominence`]: pure exponential decay of the initial
//!   score, invoked lazily/periodically by the embedding application.

pub mod decay;
pub mod novelty;
pub mod richness;

pub use decay::{decay_constant, recalculate_prominence};
pub use richness::excerpt;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::model::{ContentItem, SourceType};
use crate::storage::ContentStore;

/// How far back the novelty check scans for similar content.
pub const NOVELTY_WINDOW_HOURS: i64 = 24;

/// Base scores by source type.
///
/// User-authored content starts well above auto-ingested content.
pub fn base_score(source_type: SourceType) -> f64 {
    match source_type {
        SourceType::User => 100.0,
        SourceType::Auto => 40.0,
    }
}

/// The score pair assigned to a freshly created item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAssignment {
    /// Set exactly once, never recomputed.
    pub initial_score: i64,
    /// Equal to `initial_score` at creation; decays afterwards.
    pub prominence_score: i64,
}

/// Score a new content item.
///
/// `initial = round(base * richness * novelty)`; prominence starts equal
/// to it. The single store read (keywords of the last 24h, projection
/// only) propagates failure to the caller — content creation must fail
/// atomically rather than persist a partially scored item.
pub async fn compute_initial_score(
    store: &dyn ContentStore,
    item: &ContentItem,
    now: DateTime<Utc>,
) -> Result<ScoreAssignment> {
    let base = base_score(item.source_type);
    let richness = richness::richness_multiplier(item);

    let since = now - Duration::hours(NOVELTY_WINDOW_HOURS);
    let recent = store.find_recent_content_keywords(since).await?;
    let novelty = novelty::novelty_multiplier(&item.keywords, &recent);

    let initial = (base * richness * novelty).round() as i64;

    tracing::debug!(
        content_id = %item.id,
        base,
        richness,
        novelty,
        initial_score = initial,
        "Scored new content item"
    );

    Ok(ScoreAssignment {
        initial_score: initial,
        prominence_score: initial,
    })
}

//! Trending candidate selection.
//!
//! Picks the user-authored item with the highest stored prominence score
//! inside the recent window. The stored score is authoritative here; a
//! periodic recompute pass (outside this core, on a cadence shorter than
//! the trending window) keeps it fresh via
//! [`crate::scoring::recalculate_prominence`].

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::model::{ContentItem, SourceType};
use crate::storage::ContentStore;

/// Select the current trending candidate, if any.
///
/// `Ok(None)` is the distinct no-candidate outcome — a quiet window is
/// not an error.
pub async fn select_trending(
    content: &dyn ContentStore,
    window: Duration,
    now: DateTime<Utc>,
) -> Result<Option<ContentItem>> {
    let since = now - window;
    let candidate = content
        .find_trending_candidate(since, SourceType::User)
        .await?;

    match &candidate {
        Some(item) => tracing::debug!(
            content_id = %item.id,
            prominence = item.prominence_score,
            "Selected trending candidate"
        ),
        None => tracing::debug!(window_hours = window.num_hours(), "No trending candidate"),
    }

    Ok(candidate)
}

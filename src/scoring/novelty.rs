//! Novelty penalty — keyword-overlap similarity against recent items.
//!
//! New content that is too similar to something already published in the
//! novelty window gets its score halved. Similarity is a min-based
//! Jaccard variant: `|A ∩ B| / min(|A|, |B|)`, so a short keyword set
//! fully contained in a longer one counts as identical.

use std::collections::HashSet;

/// Similarity above this triggers the redundancy penalty.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Multiplier applied to redundant content.
pub const REDUNDANCY_PENALTY: f64 = 0.5;

/// Min-based Jaccard similarity between two keyword sets.
///
/// Empty sets have no basis for comparison and score 0.0.
pub fn keyword_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let min = a.len().min(b.len());
    if min == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / min as f64
}

/// The novelty multiplier for a new item against recent keyword sets.
///
/// The first set over the threshold short-circuits the scan; with
/// deterministic store ordering the result is reproducible, and since
/// every match yields the same fixed penalty the order never changes
/// the outcome.
pub fn novelty_multiplier(keywords: &HashSet<String>, recent: &[HashSet<String>]) -> f64 {
    let redundant = recent
        .iter()
        .any(|other| keyword_similarity(keywords, other) > SIMILARITY_THRESHOLD);
    if redundant {
        REDUNDANCY_PENALTY
    } else {
        1.0
    }
}

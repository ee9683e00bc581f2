//! Richness multiplier — how much substance a content item carries.
//!
//! Purely derived from the item's own fields: word count of the
//! stripped-tag body, embedded image count (inline `<img>` plus the
//! distinct featured image), subheading count, and a bonus when the
//! item sits in a promoted category. All factors are multiplicative.

use regex_lite::Regex;
use std::sync::LazyLock;

use crate::model::ContentItem;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b").expect("valid regex"));
static SUBHEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[23][^>]*>").expect("valid regex"));

/// Categories that earn the promoted-category bonus.
pub const PROMOTED_CATEGORIES: &[&str] = &["breaking", "exclusive", "investigation"];

/// Bonus multiplier for items in a promoted category.
const PROMOTED_BONUS: f64 = 1.25;

/// Strip HTML tags, leaving plain text.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, " ").into_owned()
}

/// Word count of the stripped-tag body.
pub fn word_count(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

/// Inline images in the body plus the featured image, if any.
pub fn image_count(item: &ContentItem) -> usize {
    IMG_RE.find_iter(&item.content).count() + usize::from(item.image_url.is_some())
}

/// `<h2>`/`<h3>` subheadings in the body.
pub fn subheading_count(html: &str) -> usize {
    SUBHEAD_RE.find_iter(html).count()
}

/// A plain-text excerpt of the body, truncated on a char boundary.
///
/// Used as the notification body so wire payloads stay bounded.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = strip_tags(html);
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(max_chars).collect();
    format!("{}…", truncated.trim_end())
}

fn word_multiplier(words: usize) -> f64 {
    if words > 300 {
        1.5
    } else if words > 150 {
        1.2
    } else {
        1.0
    }
}

fn image_multiplier(images: usize) -> f64 {
    if images >= 4 {
        1.4
    } else if images >= 2 {
        1.2
    } else {
        1.0
    }
}

fn subheading_multiplier(subheadings: usize) -> f64 {
    if subheadings >= 5 {
        1.3
    } else if subheadings >= 2 {
        1.15
    } else {
        1.0
    }
}

fn category_multiplier(item: &ContentItem) -> f64 {
    let promoted = item
        .categories
        .iter()
        .any(|c| PROMOTED_CATEGORIES.contains(&c.as_str()));
    if promoted {
        PROMOTED_BONUS
    } else {
        1.0
    }
}

/// Combined multiplicative richness factor for an item.
pub fn richness_multiplier(item: &ContentItem) -> f64 {
    word_multiplier(word_count(&item.content))
        * image_multiplier(image_count(item))
        * subheading_multiplier(subheading_count(&item.content))
        * category_multiplier(item)
}

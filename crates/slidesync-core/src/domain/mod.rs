//! Pure domain logic: the addressable location and the slide locator.

pub mod location;
pub mod navigate;

use std::sync::LazyLock;

use regex::Regex;

use location::PageLocation;

/// 1-based integer identifying the currently displayed slide.
///
/// The value is derived on demand from the page location and never cached as
/// authoritative state; `1` is the implicit index of a deck that carries no
/// slide marker in its location at all.
pub type SlideIndex = u32;

/// The slide every deck starts on when the location carries no slide marker.
pub const DEFAULT_SLIDE: SlideIndex = 1;

// ── Locator patterns ──────────────────────────────────────────────────────────
//
// The three ways a preview encodes its slide index in the location, in
// priority order. Compiled once; the patterns are static and must compile.

/// `#<digits>` anywhere in the fragment (scanned with the `#` re-attached,
/// first match wins).
static FRAGMENT_SLIDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\d+)").unwrap());

/// A trailing `/<digits>` path segment. Shared with the navigation planner,
/// which rewrites the segment this pattern locates.
pub(crate) static TRAILING_PATH_SLIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)$").unwrap());

/// A leading run of digits, used on the `slide` query parameter value.
static LEADING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)").unwrap());

// ── Slide locator ─────────────────────────────────────────────────────────────

/// Derives the current slide index from a page location.
///
/// Reads the location in priority order:
///
/// 1. a fragment containing `#<digits>` (e.g. `http://host/deck#5`),
/// 2. a path ending in a run of digits (e.g. `http://host/deck/5`),
/// 3. a `slide` query parameter (e.g. `http://host/deck?slide=5`).
///
/// Returns [`DEFAULT_SLIDE`] when none of the patterns match. Pure and
/// idempotent; a digit run too large for [`SlideIndex`] is treated as a
/// non-match and the next pattern in priority order applies.
///
/// # Examples
///
/// ```rust
/// use slidesync_core::{slide_index, PageLocation};
///
/// assert_eq!(slide_index(&PageLocation::parse("http://localhost:3030/12#5")), 5);
/// assert_eq!(slide_index(&PageLocation::parse("http://localhost:3030/12")), 12);
/// assert_eq!(slide_index(&PageLocation::parse("http://localhost:3030/")), 1);
/// ```
pub fn slide_index(location: &PageLocation) -> SlideIndex {
    fragment_slide(location)
        .or_else(|| path_slide(location))
        .or_else(|| query_slide(location))
        .unwrap_or(DEFAULT_SLIDE)
}

/// First `#<digits>` match inside the fragment.
fn fragment_slide(location: &PageLocation) -> Option<SlideIndex> {
    let fragment = location.fragment()?;
    // Scan with the delimiter re-attached so a nested `#` inside the fragment
    // (e.g. `#notes#7`) is found the same way the preview's router finds it.
    let hash = format!("#{fragment}");
    FRAGMENT_SLIDE
        .captures(&hash)
        .and_then(|caps| caps[1].parse().ok())
}

/// Trailing digit segment of the path.
fn path_slide(location: &PageLocation) -> Option<SlideIndex> {
    TRAILING_PATH_SLIDE
        .captures(location.path())
        .and_then(|caps| caps[1].parse().ok())
}

/// Leading digit run of the `slide` query parameter.
fn query_slide(location: &PageLocation) -> Option<SlideIndex> {
    let value = location.query_param("slide")?;
    LEADING_DIGITS
        .captures(value)
        .and_then(|caps| caps[1].parse().ok())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Navigation planning: the location mutation that moves the preview to a
//! requested slide.
//!
//! Planning is split from applying so the mutation policy stays pure and
//! fully testable. [`plan_navigation`] computes *what* the new location is
//! and whether the host page needs to raise a synthetic location-changed
//! signal; the host page implementation applies the plan and emits the event.
//!
//! # Why a synthetic signal?
//!
//! A fragment rewrite is observable natively — every fragment router fires on
//! it. A history-style path rewrite is not: pages that update history without
//! a reload get no native change event, so the host page must raise the
//! change signal itself. The `synthetic_event` flag carries that distinction
//! as an explicit, named part of the plan.

use super::location::PageLocation;
use super::{SlideIndex, TRAILING_PATH_SLIDE};

/// A single location mutation produced by [`plan_navigation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPlan {
    /// The location the preview should end up at.
    pub target: PageLocation,
    /// `true` when applying the plan must raise a synthetic location-changed
    /// signal because no native one will fire (history-style path rewrites).
    pub synthetic_event: bool,
}

/// Computes the location mutation that moves the preview to `slide`.
///
/// Returns `None` for `slide == 0` — callers treat that as a no-op, matching
/// the protocol rule that invalid navigation targets are silently ignored.
///
/// Mutation policy, in priority order:
///
/// 1. The location carries a fragment → rewrite the fragment to `<slide>`;
///    the preview's own fragment router reacts, so no synthetic signal is
///    needed.
/// 2. The path ends in a run of digits → replace that trailing run; the
///    history update is silent, so the plan requests a synthetic signal.
/// 3. Otherwise → append `/<slide>` to the path (stripping one trailing `/`
///    first); synthetic signal as in case 2.
///
/// Exactly one mutation per plan, and never a reload.
///
/// # Examples
///
/// ```rust
/// use slidesync_core::{plan_navigation, PageLocation};
///
/// let plan = plan_navigation(&PageLocation::parse("/deck#3"), 7).unwrap();
/// assert_eq!(plan.target.fragment(), Some("7"));
/// assert!(!plan.synthetic_event);
/// ```
pub fn plan_navigation(current: &PageLocation, slide: SlideIndex) -> Option<NavigationPlan> {
    if slide == 0 {
        return None;
    }

    // Fragment-based navigation first: it is what fragment-routed previews
    // expect, and the only case with a native change event.
    if current.fragment().is_some() {
        return Some(NavigationPlan {
            target: current.clone().with_fragment(slide.to_string()),
            synthetic_event: false,
        });
    }

    // Path-based navigation: replace a trailing digit segment in place.
    if TRAILING_PATH_SLIDE.is_match(current.path()) {
        let path = TRAILING_PATH_SLIDE
            .replace(current.path(), format!("/{slide}"))
            .into_owned();
        return Some(NavigationPlan {
            target: current.clone().with_path(path),
            synthetic_event: true,
        });
    }

    // Fallback: the location carries no slide marker yet; append one.
    let base = current.path().strip_suffix('/').unwrap_or(current.path());
    Some(NavigationPlan {
        target: current.clone().with_path(format!("{base}/{slide}")),
        synthetic_event: true,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

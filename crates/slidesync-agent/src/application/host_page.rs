//! The host page port.
//!
//! The preview page is an external collaborator: this crate never renders a
//! slide or touches a DOM. What it needs from the page is narrow —
//!
//! 1. read the current addressable location,
//! 2. apply a planned location mutation,
//! 3. hear about navigation, whatever caused it.
//!
//! [`HostPage`] captures exactly that contract. Implementations are in the
//! infrastructure layer ([`MemoryHostPage`](crate::MemoryHostPage) for
//! in-process use) or in embedders that front a real browser page.

use tokio::sync::broadcast;

use slidesync_core::{NavigationPlan, PageLocation};

/// A navigation signal observed on the host page.
///
/// The watcher treats every variant the same way — recompute the slide index
/// and compare — so a page that can only produce one kind of signal still
/// syncs correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The fragment changed and the page's native fragment event fired.
    FragmentChanged,
    /// A history-style transition: either the browser's own back/forward
    /// navigation, or the synthetic signal raised after a programmatic path
    /// rewrite (see [`NavigationPlan::synthetic_event`]).
    HistoryTransition,
    /// The page's subtree changed structurally. A proxy signal: single-page
    /// routers often rewrite the URL without firing any navigation event, so
    /// DOM churn is treated as "the location may have changed, go look".
    SubtreeMutated,
}

/// Contract between the sync agent and the page it lives in.
///
/// Implementations must be cheap to call at any time: `location()` is read
/// on every event the watcher receives.
pub trait HostPage: Send + Sync {
    /// The page's current addressable location.
    fn location(&self) -> PageLocation;

    /// Applies a navigation plan: exactly one location mutation, never a
    /// reload, and exactly one emitted event — except when the target equals
    /// the current location, in which case nothing happens at all.
    fn apply(&self, plan: &NavigationPlan);

    /// A fresh subscription to the page's navigation events.
    ///
    /// Dropping the receiver releases the subscription; nothing leaks across
    /// repeated agent start/stop cycles.
    fn subscribe(&self) -> broadcast::Receiver<PageEvent>;
}

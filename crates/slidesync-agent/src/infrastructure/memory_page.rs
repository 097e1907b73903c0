//! In-memory host page for tests and in-process embedders.
//!
//! # Why an in-memory page?
//!
//! The real preview page lives in a browser:
//!
//! - Its location is the window URL; mutations go through a fragment setter
//!   or a history update.
//! - Its events come from the browser's own navigation machinery.
//!
//! None of that is reachable from Rust test code. `MemoryHostPage` honors
//! the same [`HostPage`] contract against a `Mutex<PageLocation>` and a
//! broadcast channel, and adds hooks that simulate the three ways a real
//! page moves: user navigation (location change + native-style event), a
//! silent single-page-router rewrite, and bare subtree churn.
//!
//! # Usage in tests
//!
//! ```rust
//! use slidesync_agent::{HostPage, MemoryHostPage, PageEvent};
//! use slidesync_core::PageLocation;
//!
//! let page = MemoryHostPage::new(PageLocation::parse("/deck#5"));
//! let _events = page.subscribe();
//!
//! // Simulate the user pressing "next slide" in the preview UI.
//! page.replace_location(PageLocation::parse("/deck#6"), PageEvent::FragmentChanged);
//! assert_eq!(page.location().fragment(), Some("6"));
//! ```

use std::sync::Mutex;

use tokio::sync::broadcast;

use slidesync_core::{NavigationPlan, PageLocation};

use crate::application::host_page::{HostPage, PageEvent};

/// Capacity of the page event channel. Watchers that fall further behind
/// than this see a lag error and resync from the current location.
const EVENT_BUFFER: usize = 32;

/// A [`HostPage`] backed by plain process memory.
pub struct MemoryHostPage {
    location: Mutex<PageLocation>,
    events: broadcast::Sender<PageEvent>,
}

impl MemoryHostPage {
    /// Creates a page sitting at `initial`.
    pub fn new(initial: PageLocation) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            location: Mutex::new(initial),
            events,
        }
    }

    /// Simulates a navigation the page itself announces: replaces the
    /// location and emits `event` — unless the location is already there,
    /// in which case no event fires (matching native fragment routers,
    /// which stay silent on a same-value write).
    pub fn replace_location(&self, location: PageLocation, event: PageEvent) {
        {
            let mut current = self.location.lock().unwrap();
            if *current == location {
                return;
            }
            *current = location;
        }
        let _ = self.events.send(event);
    }

    /// Simulates a single-page router rewriting the URL without firing any
    /// navigation event. Pair with [`touch_subtree`](Self::touch_subtree) to
    /// exercise the mutation-proxy detection path.
    pub fn replace_location_silently(&self, location: PageLocation) {
        *self.location.lock().unwrap() = location;
    }

    /// Emits a bare subtree-mutation signal, as a DOM observer would on any
    /// structural change — related to navigation or not.
    pub fn touch_subtree(&self) {
        let _ = self.events.send(PageEvent::SubtreeMutated);
    }
}

impl HostPage for MemoryHostPage {
    fn location(&self) -> PageLocation {
        self.location.lock().unwrap().clone()
    }

    fn apply(&self, plan: &NavigationPlan) {
        {
            let mut current = self.location.lock().unwrap();
            // Unchanged target: nothing to mutate, nothing to announce.
            if *current == plan.target {
                return;
            }
            *current = plan.target.clone();
        }
        let event = if plan.synthetic_event {
            PageEvent::HistoryTransition
        } else {
            PageEvent::FragmentChanged
        };
        // No subscribers is fine — the page does not care who is listening.
        let _ = self.events.send(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

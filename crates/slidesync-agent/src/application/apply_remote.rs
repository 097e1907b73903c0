//! Inbound dispatch: apply a remote `goto` frame to the host page.
//!
//! The dispatcher is the full extent of the agent's inbound protocol
//! surface. One rule governs everything that can go wrong: a frame that is
//! not a well-formed `goto` with a usable slide number is logged at debug
//! level and dropped. No error reaches the peer, nothing reconnects, nothing
//! crashes — a noisy peer degrades into silence, not failure.

use tracing::debug;

use slidesync_core::{plan_navigation, InboundMessage, SlideIndex};

use super::host_page::HostPage;

/// Parses a text frame and, for a valid `goto`, navigates the host page.
///
/// Returns the slide that was applied, or `None` when the frame was
/// discarded (malformed, unknown type, or slide 0). The slide value is
/// passed to the page as-is — the deck's actual slide count is unknown to
/// this core, so out-of-range targets are the page router's problem.
pub fn apply_remote_frame(page: &dyn HostPage, raw: &str) -> Option<SlideIndex> {
    let message: InboundMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(error) => {
            debug!(%error, "discarding frame that is not a goto message");
            return None;
        }
    };

    let InboundMessage::Goto { slide } = message;
    let Some(plan) = plan_navigation(&page.location(), slide) else {
        debug!(slide, "discarding goto with invalid slide number");
        return None;
    };

    debug!(slide, target = %plan.target, "applying remote navigation");
    page.apply(&plan);
    Some(slide)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

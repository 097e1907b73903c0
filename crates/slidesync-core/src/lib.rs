//! # slidesync-core
//!
//! Shared library for SlideSync containing the addressable-location model,
//! the slide locator and navigation planner, the JSON wire message types, and
//! the reconnect backoff policy.
//!
//! This crate is used by both the preview-side agent and the editor-side
//! relay. It has zero dependencies on sockets, timers, or async runtimes.
//!
//! # Architecture overview
//!
//! SlideSync keeps a slide-deck preview and an external editor in sync on a
//! single piece of state: the current slide index. The preview encodes that
//! index in its addressable location (fragment, path, or query string); the
//! editor learns about it through small JSON messages over a persistent
//! connection.
//!
//! This crate defines:
//!
//! - **`domain`** – Pure business logic with no I/O. [`PageLocation`] models
//!   the addressable location, [`slide_index`] derives the current slide from
//!   it, and [`plan_navigation`] computes the location mutation that moves
//!   the preview to a requested slide.
//!
//! - **`protocol`** – What travels over the wire. [`OutboundMessage`] and
//!   [`InboundMessage`] are the two JSON message shapes, and
//!   [`ReconnectBackoff`] is the shared policy for re-dialing a dropped
//!   connection.

// Declare the two top-level modules. Rust will look for each in a
// subdirectory with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `slidesync_core::PageLocation` instead of the full module path.
pub use domain::location::PageLocation;
pub use domain::navigate::{plan_navigation, NavigationPlan};
pub use domain::{slide_index, SlideIndex, DEFAULT_SLIDE};
pub use protocol::backoff::ReconnectBackoff;
pub use protocol::messages::{InboundMessage, OutboundMessage};

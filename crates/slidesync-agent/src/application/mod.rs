//! Application layer use cases for the sync agent.
//!
//! - **`host_page`** – The port the agent drives: a readable/writable page
//!   location plus a stream of navigation events. The real page lives in a
//!   browser; implementations adapt whatever location mechanism they have.
//!
//! - **`watch_changes`** – Change detection: collapse any number of page
//!   events into at most one outbound notification per distinct slide index.
//!
//! - **`apply_remote`** – Inbound dispatch: parse a text frame and, for a
//!   valid `goto`, navigate the host page. Everything else is discarded.

pub mod apply_remote;
pub mod host_page;
pub mod watch_changes;

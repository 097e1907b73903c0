//! slidesync-agent library crate.
//!
//! The preview-side half of SlideSync: an agent that derives the current
//! slide from the host page's location, pushes local navigation to an editor
//! peer over a WebSocket, applies the peer's `goto` commands to the page, and
//! keeps the connection alive across drops with capped exponential backoff.
//!
//! # Architecture
//!
//! ```text
//! Host page (preview)                      Editor peer
//!   location + events                        ws://127.0.0.1:8765
//!         ↕                                        ↕
//! [slidesync-agent]
//!   ├── domain/          SyncConfig
//!   ├── application/     HostPage port, change tracking, remote dispatch
//!   └── infrastructure/
//!         ├── memory_page/  In-memory HostPage for tests and embedders
//!         ├── connection/   WebSocket client, state machine, reconnect loop
//!         └── sync_agent/   Task lifecycle (start/stop)
//! ```
//!
//! # Layer rules
//!
//! - `domain` holds configuration only — no I/O, no async.
//! - `application` depends on `domain` and `slidesync-core`; its logic is
//!   pure apart from the `HostPage` port it drives.
//! - `infrastructure` depends on everything plus `tokio` and `tungstenite`.
//!
//! # The host page is a port
//!
//! The real preview page lives in a browser this crate never touches. The
//! agent only assumes the contract in [`application::host_page::HostPage`]:
//! a readable/writable location and a stream of navigation events. Anything
//! honoring that contract syncs — the bundled [`MemoryHostPage`] does it
//! in-process for tests and embedders.

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the embedder-facing surface at the crate root.
pub use application::host_page::{HostPage, PageEvent};
pub use domain::config::SyncConfig;
pub use infrastructure::connection::ConnectionState;
pub use infrastructure::memory_page::MemoryHostPage;
pub use infrastructure::sync_agent::SyncAgent;

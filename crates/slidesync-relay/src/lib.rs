//! slidesync-relay library crate.
//!
//! The editor-side meeting point of SlideSync. Editors speak
//! newline-delimited JSON over a local TCP socket; the preview agent speaks
//! WebSocket. The relay listens on both, keeps one peer of each kind
//! attached, and forwards frames verbatim between them.
//!
//! # Architecture
//!
//! ```text
//! Preview agent (JSON over WebSocket, port 8765)
//!         ↕
//! [slidesync-relay]
//!   ├── domain/          RelayConfig
//!   ├── application/     PeerHub: who is attached, frame forwarding
//!   └── infrastructure/
//!         ├── ws_server/      preview-side WebSocket accept loop
//!         └── editor_server/  editor-side TCP line accept loop
//!         ↕
//! Editor plugin (newline-delimited JSON over TCP, port 8766)
//! ```
//!
//! # Single pair, latest wins
//!
//! The relay is deliberately not a broadcast hub: one preview and one editor
//! are attached at a time, and a newer connection of either kind replaces
//! the older one (whose delivery channel closes, ending its session). Sync
//! is a conversation between one deck and one editor.
//!
//! # Best-effort forwarding
//!
//! Frames are forwarded verbatim, without interpretation. A frame arriving
//! while the opposite side is unattached is dropped with a debug log — the
//! protocol re-establishes position on every connect, so missed frames heal
//! themselves.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::hub::PeerHub;
pub use domain::config::RelayConfig;

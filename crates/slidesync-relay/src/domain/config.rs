//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for the relay's runtime
//! settings. The infrastructure layer populates it from CLI arguments;
//! defaults match the fixed ports the preview agent and editor plugins dial.

use std::net::SocketAddr;

/// All runtime configuration for the relay.
///
/// # Example
///
/// ```rust
/// use slidesync_relay::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.preview_bind.port(), 8765);
/// assert_eq!(cfg.editor_bind.port(), 8766);
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the preview-side WebSocket listener binds to.
    ///
    /// Loopback by default: the preview and the relay run on the same
    /// machine, and the protocol carries no authentication.
    pub preview_bind: SocketAddr,

    /// Address the editor-side TCP line listener binds to.
    pub editor_bind: SocketAddr,
}

impl Default for RelayConfig {
    /// | Field        | Default          |
    /// |--------------|------------------|
    /// | preview_bind | `127.0.0.1:8765` |
    /// | editor_bind  | `127.0.0.1:8766` |
    fn default() -> Self {
        Self {
            // Compile-time-known valid socket address strings.
            preview_bind: "127.0.0.1:8765".parse().unwrap(),
            editor_bind: "127.0.0.1:8766".parse().unwrap(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Agent configuration.
//!
//! [`SyncConfig`] is a plain struct with defaults that match the fixed
//! endpoint the editor side listens on. The agent core takes no CLI and
//! reads no environment — if an embedder wants a different endpoint or test
//! wants millisecond backoff, it sets the fields before constructing the
//! agent.

use std::time::Duration;

use slidesync_core::protocol::backoff;

/// The fixed local endpoint the editor peer (or relay) listens on for
/// preview connections.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8765";

/// All runtime configuration for the preview-side sync agent.
///
/// # Example
///
/// ```rust
/// use slidesync_agent::SyncConfig;
///
/// let cfg = SyncConfig::default();
/// assert_eq!(cfg.endpoint, "ws://127.0.0.1:8765");
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// WebSocket URL of the editor peer.
    pub endpoint: String,

    /// Delay before the first reconnect attempt; also the value backoff
    /// resets to after a successful open.
    pub initial_backoff: Duration,

    /// Cap the growing reconnect delay saturates at.
    pub max_backoff: Duration,

    /// Capacity of the outbound message queue between the change watcher and
    /// the connection task. Sends beyond this while the connection is busy
    /// are dropped, not buffered — stale slide positions are worthless.
    pub outbound_buffer: usize,
}

impl Default for SyncConfig {
    /// Defaults suitable for a local editor session:
    ///
    /// | Field           | Default               |
    /// |-----------------|-----------------------|
    /// | endpoint        | `ws://127.0.0.1:8765` |
    /// | initial_backoff | 1000 ms               |
    /// | max_backoff     | 30000 ms              |
    /// | outbound_buffer | 16                    |
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            initial_backoff: backoff::INITIAL_DELAY,
            max_backoff: backoff::MAX_DELAY,
            outbound_buffer: 16,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Infrastructure layer: the two listeners and their session loops.

pub mod editor_server;
pub mod ws_server;

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

pub use editor_server::run_editor_listener;
pub use ws_server::run_preview_listener;

/// Errors raised at the listener seam.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The listener socket could not be bound (port in use, no permission).
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Binds a listener, mapping the failure to a [`RelayError`] that names the
/// address. Binding is split from running so callers (and tests) can bind
/// port 0 and read the assigned address before the accept loop starts.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, RelayError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::BindFailed { addr, source })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

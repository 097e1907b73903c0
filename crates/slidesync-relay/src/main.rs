//! SlideSync relay — entry point.
//!
//! This binary is the meeting point between a slide-deck preview and a text
//! editor. The preview agent connects over WebSocket; the editor plugin
//! connects over a local TCP socket speaking newline-delimited JSON. The
//! relay forwards `navigate`/`goto` frames verbatim between the attached
//! pair.
//!
//! # Usage
//!
//! ```text
//! slidesync-relay [OPTIONS]
//!
//! Options:
//!   --preview-port <PORT>  Preview WebSocket port [default: 8765]
//!   --editor-port  <PORT>  Editor TCP port [default: 8766]
//!   --bind         <ADDR>  IP address to bind both listeners to [default: 127.0.0.1]
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                 | Default     | Description             |
//! |--------------------------|-------------|-------------------------|
//! | `SLIDESYNC_PREVIEW_PORT` | `8765`      | Preview WebSocket port  |
//! | `SLIDESYNC_EDITOR_PORT`  | `8766`      | Editor TCP port         |
//! | `SLIDESYNC_BIND`         | `127.0.0.1` | Bind address            |
//!
//! Log output is controlled by `RUST_LOG` (default `info`).

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slidesync_relay::infrastructure::{bind, run_editor_listener, run_preview_listener};
use slidesync_relay::{PeerHub, RelayConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// SlideSync relay.
///
/// Pairs one preview (WebSocket) peer with one editor (TCP line) peer and
/// forwards slide-sync frames between them.
#[derive(Debug, Parser)]
#[command(
    name = "slidesync-relay",
    about = "Relay between a slide-deck preview and an editor plugin",
    version
)]
struct Cli {
    /// TCP port for the preview-side WebSocket listener.
    #[arg(long, default_value_t = 8765, env = "SLIDESYNC_PREVIEW_PORT")]
    preview_port: u16,

    /// TCP port for the editor-side line-protocol listener.
    #[arg(long, default_value_t = 8766, env = "SLIDESYNC_EDITOR_PORT")]
    editor_port: u16,

    /// IP address both listeners bind to.
    ///
    /// The default accepts only local connections — the protocol carries no
    /// authentication, so keep it on loopback unless the network is trusted.
    #[arg(long, default_value = "127.0.0.1", env = "SLIDESYNC_BIND")]
    bind: String,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`RelayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a valid IP address.
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        let preview_bind: SocketAddr = format!("{}:{}", self.bind, self.preview_port)
            .parse()
            .with_context(|| format!("invalid preview bind address: '{}'", self.bind))?;
        let editor_bind: SocketAddr = format!("{}:{}", self.bind, self.editor_port)
            .parse()
            .with_context(|| format!("invalid editor bind address: '{}'", self.bind))?;

        Ok(RelayConfig {
            preview_bind,
            editor_bind,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log level from RUST_LOG, defaulting to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_relay_config()?;

    info!(
        "SlideSync relay starting — preview={}, editor={}",
        config.preview_bind, config.editor_bind
    );

    // Graceful shutdown: Ctrl+C clears the flag both accept loops poll.
    let running = Arc::new(AtomicBool::new(true));
    let running_signal = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_signal.store(false, Ordering::Relaxed);
            }
            Err(error) => {
                tracing::error!("failed to listen for Ctrl+C signal: {error}");
            }
        }
    });

    let hub = Arc::new(PeerHub::new());

    // Bind before serving so a port conflict fails fast with a named address.
    let preview_listener = bind(config.preview_bind).await?;
    let editor_listener = bind(config.editor_bind).await?;

    tokio::try_join!(
        run_preview_listener(preview_listener, Arc::clone(&hub), Arc::clone(&running)),
        run_editor_listener(editor_listener, hub, running),
    )?;

    info!("SlideSync relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

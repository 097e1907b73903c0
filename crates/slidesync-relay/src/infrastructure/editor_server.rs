//! Editor-side TCP listener: newline-delimited JSON sessions.
//!
//! Editor plugins speak the simplest thing a text editor can script: one
//! JSON object per line over a local TCP socket. Inbound lines are forwarded
//! to the preview side; frames delivered by the hub are written back with a
//! trailing `\n`.
//!
//! Blank lines are skipped rather than forwarded — some editor runtimes
//! flush an empty line on disconnect, and an empty frame is never a valid
//! message anyway.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use slidesync_core::InboundMessage;

use crate::application::hub::PeerHub;

const DELIVERY_BUFFER: usize = 32;

/// Runs the editor accept loop until `running` is cleared.
///
/// Same accept-loop shape as the preview listener: per-session tasks, and a
/// short accept timeout so the shutdown flag is honored promptly.
pub async fn run_editor_listener(
    listener: TcpListener,
    hub: Arc<PeerHub>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let local_addr = listener.local_addr().context("editor listener address")?;
    info!("editor TCP listener on {local_addr}");

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping editor accept loop");
            break;
        }

        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let hub = Arc::clone(&hub);
                tokio::spawn(handle_editor_session(stream, peer_addr, hub));
            }
            Ok(Err(error)) => {
                error!(%error, "editor accept error");
            }
            Err(_) => {
                // Timeout — loop back to check the shutdown flag.
            }
        }
    }

    Ok(())
}

async fn handle_editor_session(stream: TcpStream, peer_addr: SocketAddr, hub: Arc<PeerHub>) {
    let session = Uuid::new_v4();
    match run_session(stream, peer_addr, session, &hub).await {
        Ok(()) => info!(%session, "editor session closed"),
        Err(error) => warn!(%session, "editor session failed: {error:#}"),
    }
}

async fn run_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    session: Uuid,
    hub: &PeerHub,
) -> anyhow::Result<()> {
    info!(%session, %peer_addr, "editor connected");

    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let (delivery_tx, mut delivery_rx) = mpsc::channel::<String>(DELIVERY_BUFFER);
    let delivery_weak = delivery_tx.downgrade();
    hub.attach_editor(delivery_tx);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let frame = line.trim();
                    if frame.is_empty() {
                        continue;
                    }
                    if let Ok(message) = serde_json::from_str::<InboundMessage>(frame) {
                        debug!(%session, ?message, "editor frame");
                    }
                    if !hub.to_preview(frame.to_string()).await {
                        debug!(%session, "no preview attached; frame dropped");
                    }
                }
                Ok(None) => {
                    debug!(%session, "editor stream ended (EOF)");
                    break;
                }
                Err(error) => {
                    warn!(%session, %error, "editor read error");
                    break;
                }
            },

            delivery = delivery_rx.recv() => match delivery {
                Some(frame) => {
                    // Newline framing on the editor channel.
                    let mut out = frame;
                    out.push('\n');
                    if let Err(error) = write_half.write_all(out.as_bytes()).await {
                        warn!(%session, %error, "delivery to editor failed");
                        break;
                    }
                }
                None => {
                    debug!(%session, "replaced by a newer editor peer");
                    break;
                }
            },
        }
    }

    if let Some(current) = delivery_weak.upgrade() {
        hub.detach_editor(&current);
    }
    Ok(())
}

//! Preview-side WebSocket listener: accept loop and per-session forwarding.
//!
//! Each accepted connection is upgraded to a WebSocket, attached to the
//! [`PeerHub`] as *the* preview peer, and pumped in a single select loop:
//! text frames from the socket go to the editor side, frames delivered by
//! the hub go to the socket. The session ends when the socket closes, a
//! transport error occurs, or a newer preview peer replaces this one (the
//! hub drops this session's delivery sender, closing the channel).

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use slidesync_core::OutboundMessage;

use crate::application::hub::PeerHub;

/// Delivery-channel capacity per session; a preview that stops reading this
/// far behind is better served by its own reconnect.
const DELIVERY_BUFFER: usize = 32;

/// Runs the preview accept loop until `running` is cleared.
///
/// Each accepted connection gets its own tokio task, so one slow session
/// never stalls the accept loop. A short timeout on `accept()` lets the loop
/// notice the shutdown flag even when nobody is connecting.
///
/// # Errors
///
/// Infallible in the loop itself; accept errors are logged and the loop
/// continues. The `Result` return keeps the signature uniform with the
/// editor listener for `try_join!`.
pub async fn run_preview_listener(
    listener: TcpListener,
    hub: Arc<PeerHub>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let local_addr = listener.local_addr().context("preview listener address")?;
    info!("preview WebSocket listener on {local_addr}");

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping preview accept loop");
            break;
        }

        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let hub = Arc::clone(&hub);
                tokio::spawn(handle_preview_session(stream, peer_addr, hub));
            }
            Ok(Err(error)) => {
                // Transient accept failure; keep serving.
                error!(%error, "preview accept error");
            }
            Err(_) => {
                // Timeout — loop back to check the shutdown flag.
            }
        }
    }

    Ok(())
}

/// Entry point of each per-session task: runs the session and logs how it
/// ended.
async fn handle_preview_session(stream: TcpStream, peer_addr: SocketAddr, hub: Arc<PeerHub>) {
    let session = Uuid::new_v4();
    match run_session(stream, peer_addr, session, &hub).await {
        Ok(()) => info!(%session, "preview session closed"),
        Err(error) => warn!(%session, "preview session failed: {error:#}"),
    }
}

async fn run_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    session: Uuid,
    hub: &PeerHub,
) -> anyhow::Result<()> {
    let ws = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;
    info!(%session, %peer_addr, "preview connected");

    let (mut ws_tx, mut ws_rx) = ws.split();

    let (delivery_tx, mut delivery_rx) = mpsc::channel::<String>(DELIVERY_BUFFER);
    // Keep only a weak handle locally: the hub owns the strong sender, so a
    // replacement drops it and `delivery_rx` closes.
    let delivery_weak = delivery_tx.downgrade();
    hub.attach_preview(delivery_tx);

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    // Diagnostics only — forwarding is verbatim either way.
                    if let Ok(message) = serde_json::from_str::<OutboundMessage>(&text) {
                        debug!(%session, ?message, "preview frame");
                    }
                    if !hub.to_editor(text).await {
                        debug!(%session, "no editor attached; frame dropped");
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    debug!(%session, "preview sent close");
                    break;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Binary(_))) => {
                    warn!(%session, "unexpected binary frame on text protocol (ignored)");
                }
                Some(Err(error)) => {
                    warn!(%session, %error, "preview transport error");
                    break;
                }
                None => {
                    debug!(%session, "preview stream ended");
                    break;
                }
            },

            delivery = delivery_rx.recv() => match delivery {
                Some(frame) => {
                    if let Err(error) = ws_tx.send(Message::Text(frame)).await {
                        warn!(%session, %error, "delivery to preview failed");
                        break;
                    }
                }
                None => {
                    debug!(%session, "replaced by a newer preview peer");
                    break;
                }
            },
        }
    }

    // Tell the preview the session is over; ignore failures on a socket
    // that is already gone.
    let _ = ws_tx.send(Message::Close(None)).await;

    // Leave the hub slot clean unless a newer session already took it.
    if let Some(current) = delivery_weak.upgrade() {
        hub.detach_preview(&current);
    }
    Ok(())
}

//! WebSocket connection management for the editor peer.
//!
//! Split in two so the rules stay testable without sockets:
//!
//! - [`LinkState`] — a pure state machine owning the [`ConnectionState`],
//!   the backoff policy, and the single-pending-reconnect marker. Every
//!   guard the protocol requires lives here.
//! - `connection_loop` — the async driver: dials, runs the frame session,
//!   and walks `LinkState` through its transitions. It is the only writer of
//!   the published connection state.
//!
//! Outbound messages reach the driver through a bounded channel; the
//! [`SlideSender`] handle the watcher holds checks the published state and
//! silently drops messages while the connection is not open. There is no
//! queueing across reconnects — a slide position from before a drop is
//! stale, and the open handshake re-reports the current one anyway.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use slidesync_core::{slide_index, OutboundMessage, ReconnectBackoff};

use crate::application::apply_remote::apply_remote_frame;
use crate::application::host_page::HostPage;
use crate::domain::config::SyncConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

// ── Connection state ──────────────────────────────────────────────────────────

/// Lifecycle of the single logical connection to the editor peer.
///
/// Owned exclusively by the connection driver; everyone else reads it
/// through the `watch` channel the agent publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection and no dial in progress.
    #[default]
    Disconnected,
    /// A dial is in flight.
    Connecting,
    /// Frames flow.
    Open,
    /// Graceful teardown on agent shutdown.
    Closing,
}

// ── Link state machine ────────────────────────────────────────────────────────

/// Pure connection/reconnect state machine.
///
/// Enforces the three invariants the resilience design rests on:
///
/// - at most one live connection attempt (`begin_connect` is a no-op unless
///   idle),
/// - at most one pending reconnect timer (`mark_closed` schedules once per
///   disconnect episode),
/// - backoff grows at timer-fire time and resets exactly once per
///   successful open.
#[derive(Debug)]
pub struct LinkState {
    state: ConnectionState,
    backoff: ReconnectBackoff,
    reconnect_pending: bool,
}

impl LinkState {
    pub fn new(backoff: ReconnectBackoff) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            backoff,
            reconnect_pending: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Requests a new dial. Returns `false` — and changes nothing — unless
    /// the link is idle, so a connect while `Connecting` or `Open` can never
    /// create a second connection object.
    pub fn begin_connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        self.state = ConnectionState::Connecting;
        true
    }

    /// The dial succeeded: the link is open and the backoff snaps back to
    /// its initial delay.
    pub fn mark_open(&mut self) {
        self.state = ConnectionState::Open;
        self.backoff.reset();
    }

    /// The connection closed or the dial failed. Returns the delay to wait
    /// before reconnecting, or `None` when a reconnect is already pending —
    /// the caller must start a timer only for `Some`.
    pub fn mark_closed(&mut self) -> Option<Duration> {
        self.state = ConnectionState::Disconnected;
        if self.reconnect_pending {
            return None;
        }
        self.reconnect_pending = true;
        Some(self.backoff.current())
    }

    /// The pending reconnect timer fired: clear the marker and grow the
    /// delay for the attempt *after* the one about to start.
    pub fn reconnect_elapsed(&mut self) {
        self.reconnect_pending = false;
        self.backoff.advance();
    }

    /// Graceful shutdown has begun; no further reconnects will be scheduled.
    pub fn begin_close(&mut self) {
        self.state = ConnectionState::Closing;
    }
}

// ── Outbound sender handle ────────────────────────────────────────────────────

/// Handle the change watcher uses to push outbound messages.
///
/// Cheap to clone; transmission is strictly best-effort.
#[derive(Clone)]
pub struct SlideSender {
    state: watch::Receiver<ConnectionState>,
    outbound: mpsc::Sender<OutboundMessage>,
}

impl SlideSender {
    pub(crate) fn new(
        state: watch::Receiver<ConnectionState>,
        outbound: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        Self { state, outbound }
    }

    /// Hands a message to the connection driver if the connection is open;
    /// silently drops it otherwise.
    pub fn send(&self, message: OutboundMessage) {
        if *self.state.borrow() != ConnectionState::Open {
            trace!(?message, "connection not open; dropping outbound message");
            return;
        }
        if let Err(error) = self.outbound.try_send(message) {
            debug!(%error, "outbound queue unavailable; dropping message");
        }
    }

    /// The connection state as last published by the driver.
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}

// ── Connection driver ─────────────────────────────────────────────────────────

/// How a frame session ended.
enum SessionEnd {
    /// Peer closed, transport error, or stream end — reconnect.
    Closed,
    /// The agent is shutting down — do not reconnect.
    Shutdown,
}

/// Dials the editor peer and keeps dialing for the lifetime of the agent.
///
/// Connection failures are never fatal: every close, refused dial, and
/// transport error lands in the same reconnect path with capped exponential
/// backoff, forever. The loop exits only when `shutdown_rx` flips.
pub(crate) async fn connection_loop(
    config: SyncConfig,
    page: Arc<dyn HostPage>,
    state_tx: watch::Sender<ConnectionState>,
    mut outbound_rx: mpsc::Receiver<OutboundMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut link = LinkState::new(ReconnectBackoff::new(
        config.initial_backoff,
        config.max_backoff,
    ));

    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        if !link.begin_connect() {
            // Single-driver loop: the guard can only trip if the loop is
            // re-entered in a non-idle state, which is a bug worth stopping.
            error!(state = ?link.state(), "connect requested while not idle");
            break;
        }
        let _ = state_tx.send(ConnectionState::Connecting);
        debug!(endpoint = %config.endpoint, "dialing editor peer");

        // The dial itself races shutdown so stop() never waits out a slow
        // connect.
        let dialed = tokio::select! {
            dialed = connect_async(config.endpoint.as_str()) => dialed,
            _ = shutdown_rx.changed() => {
                link.begin_close();
                break;
            }
        };

        match dialed {
            Ok((ws, _response)) => {
                info!(endpoint = %config.endpoint, "connected to editor peer");
                link.mark_open();
                let _ = state_tx.send(ConnectionState::Open);

                // Anything queued while disconnected is a stale position;
                // the open handshake below reports the current one.
                while outbound_rx.try_recv().is_ok() {}

                let end = run_session(ws, &page, &state_tx, &mut outbound_rx, &mut shutdown_rx)
                    .await;
                if matches!(end, SessionEnd::Shutdown) {
                    link.begin_close();
                    break;
                }
            }
            Err(error) => {
                warn!(endpoint = %config.endpoint, %error, "connect failed");
            }
        }

        // Uniform recovery path: schedule exactly one reconnect timer.
        let Some(delay) = link.mark_closed() else {
            continue;
        };
        let _ = state_tx.send(ConnectionState::Disconnected);
        info!(delay_ms = delay.as_millis() as u64, "reconnect scheduled");

        tokio::select! {
            _ = time::sleep(delay) => link.reconnect_elapsed(),
            _ = shutdown_rx.changed() => break,
        }
    }

    let _ = state_tx.send(ConnectionState::Disconnected);
    debug!("connection driver stopped");
}

/// Runs one open connection until it closes, errors, or the agent stops.
///
/// Opens by reporting the page's current slide — that send establishes the
/// editor's initial view of where the preview is — then multiplexes inbound
/// frames, outbound messages, and shutdown.
async fn run_session(
    ws: WsStream,
    page: &Arc<dyn HostPage>,
    state_tx: &watch::Sender<ConnectionState>,
    outbound_rx: &mut mpsc::Receiver<OutboundMessage>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> SessionEnd {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let initial = OutboundMessage::Navigate {
        slide: slide_index(&page.location()),
    };
    if !send_frame(&mut ws_tx, &initial).await {
        return SessionEnd::Closed;
    }

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    apply_remote_frame(page.as_ref(), &text);
                }
                Some(Ok(Message::Close(_))) => {
                    debug!("peer closed the connection");
                    return SessionEnd::Closed;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    // Protocol-level keepalive; tungstenite replies on write.
                }
                Some(Ok(Message::Binary(_))) => {
                    warn!("unexpected binary frame on text protocol (ignored)");
                }
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(error)) => {
                    // Transport errors are not distinguished from closes:
                    // force the teardown rather than linger half-open.
                    warn!(%error, "transport error; closing connection");
                    return SessionEnd::Closed;
                }
                None => {
                    debug!("connection stream ended");
                    return SessionEnd::Closed;
                }
            },

            queued = outbound_rx.recv() => match queued {
                Some(message) => {
                    if !send_frame(&mut ws_tx, &message).await {
                        return SessionEnd::Closed;
                    }
                }
                // All sender handles dropped; the agent is going away.
                None => return SessionEnd::Shutdown,
            },

            _ = shutdown_rx.changed() => {
                let _ = state_tx.send(ConnectionState::Closing);
                let _ = ws_tx.send(Message::Close(None)).await;
                return SessionEnd::Shutdown;
            }
        }
    }
}

/// Serializes and transmits one outbound message. Returns `false` when the
/// session is no longer usable.
async fn send_frame(ws_tx: &mut WsSink, message: &OutboundMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(error) => {
            // Serialization of these enums cannot realistically fail; keep
            // the session and drop the message if it somehow does.
            error!(%error, "failed to encode outbound message");
            return true;
        }
    };
    match ws_tx.send(Message::Text(json)).await {
        Ok(()) => {
            debug!(?message, "sent");
            true
        }
        Err(error) => {
            warn!(%error, "send failed; closing connection");
            false
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Agent lifecycle: owns the watcher and connection tasks.
//!
//! All sync state — the connection handle, the backoff delay, the last-seen
//! slide, the pending-timer flag — lives in the tasks a [`SyncAgent`]
//! instance spawns, never in globals, so multiple independent agents can
//! coexist and tests can tear one down cleanly and start another.
//!
//! Lifecycle:
//!
//! - [`SyncAgent::new`] builds an inert agent (no tasks, no sockets).
//! - [`SyncAgent::start`] spawns the change-watcher task and the connection
//!   driver. Calling it again while running is a no-op.
//! - [`SyncAgent::stop`] flips the shutdown channel, waits for both tasks,
//!   and leaves the agent restartable.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use slidesync_core::{slide_index, OutboundMessage, SlideIndex};

use crate::application::host_page::{HostPage, PageEvent};
use crate::application::watch_changes::ChangeTracker;
use crate::domain::config::SyncConfig;
use crate::infrastructure::connection::{connection_loop, ConnectionState, SlideSender};

/// Handles for one started run of the agent.
struct AgentTasks {
    shutdown_tx: watch::Sender<bool>,
    watcher: JoinHandle<()>,
    connection: JoinHandle<()>,
}

/// The preview-side sync agent.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use slidesync_agent::{MemoryHostPage, SyncAgent, SyncConfig};
/// use slidesync_core::PageLocation;
///
/// # async fn example() {
/// let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#1")));
/// let mut agent = SyncAgent::new(SyncConfig::default(), page);
/// agent.start();
/// // ... the preview now syncs with the editor peer ...
/// agent.stop().await;
/// # }
/// ```
pub struct SyncAgent {
    config: SyncConfig,
    page: Arc<dyn HostPage>,
    state_tx: watch::Sender<ConnectionState>,
    state_rx: watch::Receiver<ConnectionState>,
    running: Option<AgentTasks>,
}

impl SyncAgent {
    /// Builds an agent for `page`. Nothing runs until [`start`](Self::start).
    pub fn new(config: SyncConfig, page: Arc<dyn HostPage>) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            page,
            state_tx,
            state_rx,
            running: None,
        }
    }

    /// Spawns the watcher and connection tasks on the current tokio runtime.
    ///
    /// Idempotent: a second call while running does nothing.
    pub fn start(&mut self) {
        if self.running.is_some() {
            debug!("agent already started");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (outbound_tx, outbound_rx) = mpsc::channel(self.config.outbound_buffer);
        let sender = SlideSender::new(self.state_rx.clone(), outbound_tx);

        // Subscribe and prime the tracker before the tasks run, so no
        // navigation between start() returning and the watcher's first poll
        // can slip by unobserved.
        let events = self.page.subscribe();
        let initial = slide_index(&self.page.location());

        let watcher = tokio::spawn(watch_loop(
            Arc::clone(&self.page),
            events,
            initial,
            sender,
            shutdown_rx.clone(),
        ));
        let connection = tokio::spawn(connection_loop(
            self.config.clone(),
            Arc::clone(&self.page),
            self.state_tx.clone(),
            outbound_rx,
            shutdown_rx,
        ));

        self.running = Some(AgentTasks {
            shutdown_tx,
            watcher,
            connection,
        });
    }

    /// Signals shutdown and waits for both tasks to finish.
    ///
    /// Releases the page-event subscription and closes the connection (with
    /// a WebSocket Close frame when one is live). The agent can be started
    /// again afterwards.
    pub async fn stop(&mut self) {
        let Some(tasks) = self.running.take() else {
            return;
        };
        let _ = tasks.shutdown_tx.send(true);
        let _ = tasks.watcher.await;
        let _ = tasks.connection.await;
        let _ = self.state_tx.send(ConnectionState::Disconnected);
        debug!("agent stopped");
    }

    /// The connection state as last published by the connection driver.
    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// A `watch` receiver of connection-state changes, for embedders that
    /// want to surface sync status (and for tests to await `Open`).
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }
}

// ── Change watcher task ───────────────────────────────────────────────────────

/// Watches the host page and reports distinct slide changes to the
/// connection driver.
///
/// Every page event — native, synthetic, or the subtree-mutation proxy —
/// triggers a locator recompute; the [`ChangeTracker`] makes sure only
/// actual changes leave. A lagged event subscription is not fatal: the
/// recompute reads current state, so the next event resyncs everything.
async fn watch_loop(
    page: Arc<dyn HostPage>,
    mut events: broadcast::Receiver<PageEvent>,
    initial_slide: SlideIndex,
    sender: SlideSender,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut tracker = ChangeTracker::new(initial_slide);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => report_if_changed(&page, &mut tracker, &sender, Some(event)),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "page events lagged; resyncing from current location");
                    report_if_changed(&page, &mut tracker, &sender, None);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("page event stream closed");
                    break;
                }
            },
            _ = shutdown_rx.changed() => break,
        }
    }
    debug!("change watcher stopped");
}

/// One trigger: recompute the slide index and send it if it changed.
fn report_if_changed(
    page: &Arc<dyn HostPage>,
    tracker: &mut ChangeTracker,
    sender: &SlideSender,
    event: Option<PageEvent>,
) {
    let current = slide_index(&page.location());
    if let Some(slide) = tracker.observe(current) {
        debug!(?event, slide, "local navigation detected");
        sender.send(OutboundMessage::Navigate { slide });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_page::MemoryHostPage;
    use slidesync_core::PageLocation;

    fn unroutable_config() -> SyncConfig {
        SyncConfig {
            // Port 9 (discard) on loopback refuses immediately on any sane
            // test host; the agent must keep retrying without falling over.
            endpoint: "ws://127.0.0.1:9".to_string(),
            initial_backoff: std::time::Duration::from_millis(20),
            max_backoff: std::time::Duration::from_millis(100),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_new_agent_is_inert_and_disconnected() {
        let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#1")));
        let agent = SyncAgent::new(SyncConfig::default(), page);
        assert_eq!(agent.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_start_twice_is_a_no_op() {
        let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#1")));
        let mut agent = SyncAgent::new(unroutable_config(), page);

        agent.start();
        agent.start(); // must not spawn a second pair of tasks or panic

        agent.stop().await;
    }

    #[tokio::test]
    async fn test_stop_without_start_is_a_no_op() {
        let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#1")));
        let mut agent = SyncAgent::new(SyncConfig::default(), page);
        agent.stop().await;
    }

    #[tokio::test]
    async fn test_agent_survives_unreachable_endpoint_and_stops_cleanly() {
        // Arrange: endpoint nothing listens on
        let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#1")));
        let mut agent = SyncAgent::new(unroutable_config(), Arc::clone(&page) as Arc<dyn HostPage>);

        // Act: run long enough for several failed dial/backoff cycles, with
        // navigation happening while disconnected
        agent.start();
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;
        page.replace_location(PageLocation::parse("/deck#2"), PageEvent::FragmentChanged);
        tokio::time::sleep(std::time::Duration::from_millis(40)).await;

        // Assert: never open, never crashed, stops promptly
        assert_ne!(agent.connection_state(), ConnectionState::Open);
        tokio::time::timeout(std::time::Duration::from_secs(5), agent.stop())
            .await
            .expect("stop must not hang");
    }

    #[tokio::test]
    async fn test_agent_restarts_after_stop() {
        let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#1")));
        let mut agent = SyncAgent::new(unroutable_config(), page);

        agent.start();
        agent.stop().await;
        agent.start();
        agent.stop().await;
    }
}

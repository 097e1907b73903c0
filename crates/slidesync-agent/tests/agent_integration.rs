//! End-to-end tests for the sync agent over a real loopback WebSocket.
//!
//! Each test binds a throwaway listener on `127.0.0.1:0` and plays the
//! editor side of the protocol by hand: accept the agent's connection, read
//! its frames, inject `goto` commands. This exercises the full path the
//! production agent runs — tungstenite handshake, frame codec, dispatcher,
//! host page mutation, change watcher — with nothing mocked but the page.
//!
//! Timing: the agent's reconnect backoff is shrunk to tens of milliseconds
//! so the reconnect test completes quickly; every await is wrapped in a
//! generous timeout so a hang fails instead of wedging the suite.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use slidesync_agent::{ConnectionState, HostPage, MemoryHostPage, PageEvent, SyncAgent, SyncConfig};
use slidesync_core::PageLocation;

const WAIT: Duration = Duration::from_secs(5);

fn fast_config(port: u16) -> SyncConfig {
    SyncConfig {
        endpoint: format!("ws://127.0.0.1:{port}"),
        initial_backoff: Duration::from_millis(30),
        max_backoff: Duration::from_millis(200),
        ..Default::default()
    }
}

/// Binds the editor-side listener on an ephemeral port.
async fn bind_editor() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let port = listener.local_addr().expect("local addr").port();
    (listener, port)
}

/// Accepts the next agent connection and completes the WebSocket handshake.
async fn accept_agent(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = timeout(WAIT, listener.accept())
        .await
        .expect("timed out waiting for agent to connect")
        .expect("accept");
    accept_async(stream).await.expect("websocket handshake")
}

/// Reads frames until a text frame arrives, skipping protocol-level frames.
async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        let frame = timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended before a text frame")
            .expect("transport error");
        match frame {
            Message::Text(text) => return text,
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Polls `predicate` until it holds or the shared timeout elapses.
async fn wait_until(what: &str, predicate: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !predicate() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ── Open handshake ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_agent_reports_initial_position_on_open() {
    // Arrange: preview sitting on slide 5 via fragment
    let (listener, port) = bind_editor().await;
    let page = Arc::new(MemoryHostPage::new(PageLocation::parse(
        "http://localhost:3030/#5",
    )));
    let mut agent = SyncAgent::new(fast_config(port), page);

    // Act
    agent.start();
    let mut ws = accept_agent(&listener).await;

    // Assert: the first frame establishes the editor's view
    assert_eq!(next_text(&mut ws).await, r#"{"type":"navigate","slide":5}"#);
    agent.stop().await;
}

#[tokio::test]
async fn test_agent_state_reaches_open() {
    let (listener, port) = bind_editor().await;
    let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#1")));
    let mut agent = SyncAgent::new(fast_config(port), page);
    let mut states = agent.state_changes();

    agent.start();
    let _ws = accept_agent(&listener).await;

    timeout(WAIT, states.wait_for(|s| *s == ConnectionState::Open))
        .await
        .expect("timed out waiting for Open")
        .expect("state channel closed");
    agent.stop().await;
    assert_eq!(agent.connection_state(), ConnectionState::Disconnected);
}

// ── Inbound: editor drives the preview ────────────────────────────────────────

#[tokio::test]
async fn test_inbound_goto_rewrites_the_fragment() {
    let (listener, port) = bind_editor().await;
    let page = Arc::new(MemoryHostPage::new(PageLocation::parse(
        "http://localhost:3030/#5",
    )));
    let mut agent = SyncAgent::new(fast_config(port), Arc::clone(&page) as Arc<dyn HostPage>);

    agent.start();
    let mut ws = accept_agent(&listener).await;
    let _initial = next_text(&mut ws).await;

    // Act: the editor asks for slide 9
    ws.send(Message::Text(r#"{"type":"goto","slide":9}"#.into()))
        .await
        .expect("send goto");

    // Assert: the page moves, and the locally observed navigation echoes
    // back as a navigate — the editor's confirmation that the preview landed
    wait_until("fragment to become 9", || {
        page.location().fragment() == Some("9")
    })
    .await;
    assert_eq!(next_text(&mut ws).await, r#"{"type":"navigate","slide":9}"#);

    agent.stop().await;
}

#[tokio::test]
async fn test_malformed_frames_do_not_break_the_session() {
    let (listener, port) = bind_editor().await;
    let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#5")));
    let mut agent = SyncAgent::new(fast_config(port), Arc::clone(&page) as Arc<dyn HostPage>);

    agent.start();
    let mut ws = accept_agent(&listener).await;
    let _initial = next_text(&mut ws).await;

    // Act: garbage, an unknown type, and an invalid slide — then a real goto
    for junk in [
        "next slide please",
        r#"{"type":"highlight","slide":2}"#,
        r#"{"type":"goto","slide":0}"#,
    ] {
        ws.send(Message::Text(junk.into())).await.expect("send junk");
    }
    ws.send(Message::Text(r#"{"type":"goto","slide":4}"#.into()))
        .await
        .expect("send goto");

    // Assert: junk changed nothing, the session survived, the goto landed
    wait_until("fragment to become 4", || {
        page.location().fragment() == Some("4")
    })
    .await;

    agent.stop().await;
}

// ── Outbound: preview drives the editor ───────────────────────────────────────

#[tokio::test]
async fn test_local_navigation_pushes_a_navigate_frame() {
    let (listener, port) = bind_editor().await;
    let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#1")));
    let mut agent = SyncAgent::new(fast_config(port), Arc::clone(&page) as Arc<dyn HostPage>);

    agent.start();
    let mut ws = accept_agent(&listener).await;
    let _initial = next_text(&mut ws).await;

    // Act: the user flips to slide 7 in the preview
    page.replace_location(PageLocation::parse("/deck#7"), PageEvent::FragmentChanged);

    // Assert
    assert_eq!(next_text(&mut ws).await, r#"{"type":"navigate","slide":7}"#);
    agent.stop().await;
}

#[tokio::test]
async fn test_silent_spa_rewrite_is_caught_by_the_subtree_proxy() {
    let (listener, port) = bind_editor().await;
    let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck/1")));
    let mut agent = SyncAgent::new(fast_config(port), Arc::clone(&page) as Arc<dyn HostPage>);

    agent.start();
    let mut ws = accept_agent(&listener).await;
    let _initial = next_text(&mut ws).await;

    // Act: an in-page router rewrites the URL without any navigation event;
    // only the DOM churn gives it away
    page.replace_location_silently(PageLocation::parse("/deck/3"));
    page.touch_subtree();

    // Assert
    assert_eq!(next_text(&mut ws).await, r#"{"type":"navigate","slide":3}"#);

    // Further churn without a location change must not re-send
    page.touch_subtree();
    page.replace_location(PageLocation::parse("/deck/4"), PageEvent::HistoryTransition);
    assert_eq!(next_text(&mut ws).await, r#"{"type":"navigate","slide":4}"#);

    agent.stop().await;
}

// ── Resilience ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_agent_reconnects_after_the_peer_drops() {
    let (listener, port) = bind_editor().await;
    let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#6")));
    let mut agent = SyncAgent::new(fast_config(port), page);

    agent.start();

    // First session: read the hello, then drop the connection outright
    {
        let mut ws = accept_agent(&listener).await;
        assert_eq!(next_text(&mut ws).await, r#"{"type":"navigate","slide":6}"#);
    } // ws dropped here — the agent sees the close

    // Second session: the agent redials by itself and re-reports its position
    let mut ws = accept_agent(&listener).await;
    assert_eq!(next_text(&mut ws).await, r#"{"type":"navigate","slide":6}"#);

    agent.stop().await;
}

#[tokio::test]
async fn test_agent_connects_to_a_peer_that_appears_late() {
    // Arrange: reserve a port, then close the listener so the first dials fail
    let (listener, port) = bind_editor().await;
    drop(listener);

    let page = Arc::new(MemoryHostPage::new(PageLocation::parse("/deck#2")));
    let mut agent = SyncAgent::new(fast_config(port), page);
    agent.start();

    // Let a few failed dial/backoff cycles pass before the peer shows up
    tokio::time::sleep(Duration::from_millis(100)).await;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("rebind the reserved port");

    // Assert: the reconnect loop finds the late peer
    let mut ws = accept_agent(&listener).await;
    assert_eq!(next_text(&mut ws).await, r#"{"type":"navigate","slide":2}"#);

    agent.stop().await;
}

//! The peer hub: who is attached, and frame forwarding between them.
//!
//! One slot per peer kind. Attaching stores the session's delivery sender;
//! attaching again replaces the previous sender, which closes the old
//! session's delivery channel and ends it — latest peer wins. Forwarding
//! clones the current sender out of the slot and sends outside the lock, so
//! the lock is only ever held for pointer-sized bookkeeping.

use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

/// Delivery sender for one attached peer session. Frames are complete JSON
/// texts without framing delimiters; each transport adds its own.
pub type PeerSender = mpsc::Sender<String>;

#[derive(Default)]
struct HubInner {
    preview: Option<PeerSender>,
    editor: Option<PeerSender>,
}

/// Pairs the currently attached preview and editor sessions.
#[derive(Default)]
pub struct PeerHub {
    inner: Mutex<HubInner>,
}

impl PeerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a preview session, replacing any previous one. The replaced
    /// session's delivery channel closes, which ends that session.
    pub fn attach_preview(&self, sender: PeerSender) {
        let replaced = self.inner.lock().unwrap().preview.replace(sender);
        if replaced.is_some() {
            debug!("previous preview peer replaced");
        }
    }

    /// Attaches an editor session, replacing any previous one.
    pub fn attach_editor(&self, sender: PeerSender) {
        let replaced = self.inner.lock().unwrap().editor.replace(sender);
        if replaced.is_some() {
            debug!("previous editor peer replaced");
        }
    }

    /// Detaches the preview slot if `sender` is still the attached session.
    ///
    /// A session that ends on its own calls this so a dead sender does not
    /// linger; the `same_channel` check keeps a stale session from detaching
    /// its replacement.
    pub fn detach_preview(&self, sender: &PeerSender) {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .preview
            .as_ref()
            .is_some_and(|current| current.same_channel(sender))
        {
            inner.preview = None;
        }
    }

    /// Detaches the editor slot if `sender` is still the attached session.
    pub fn detach_editor(&self, sender: &PeerSender) {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .editor
            .as_ref()
            .is_some_and(|current| current.same_channel(sender))
        {
            inner.editor = None;
        }
    }

    /// Forwards a frame to the attached editor. Returns `false` when no
    /// editor is attached or its session just died — the frame is dropped
    /// either way.
    pub async fn to_editor(&self, frame: String) -> bool {
        let Some(sender) = self.inner.lock().unwrap().editor.clone() else {
            return false;
        };
        if sender.send(frame).await.is_err() {
            // The session ended without detaching; clear the stale slot.
            self.detach_editor(&sender);
            return false;
        }
        true
    }

    /// Forwards a frame to the attached preview. Same semantics as
    /// [`to_editor`](Self::to_editor).
    pub async fn to_preview(&self, frame: String) -> bool {
        let Some(sender) = self.inner.lock().unwrap().preview.clone() else {
            return false;
        };
        if sender.send(frame).await.is_err() {
            self.detach_preview(&sender);
            return false;
        }
        true
    }

    /// Whether a preview session is currently attached.
    pub fn has_preview(&self) -> bool {
        self.inner.lock().unwrap().preview.is_some()
    }

    /// Whether an editor session is currently attached.
    pub fn has_editor(&self) -> bool {
        self.inner.lock().unwrap().editor.is_some()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! # Drag Session Store
//!
//! Tracks the one drag in progress for the whole window.
//!
//! The store has a single writer at a time (the [`Draggable`](crate::draggable::Draggable)
//! that started the drag) and any number of readers. Writes replace the whole
//! value, so readers never observe a half-updated session.

use crate::payload::{DragKind, DragPayload};
use std::sync::Arc;
use tokio::sync::watch;

/// Point-in-time view of the session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragSessionState {
    pub active_drag: Option<DragPayload>,
    pub is_dragging: bool,
}

/// Shared handle to the active drag.
///
/// Cloning is cheap and every clone observes the same session. Independent
/// stores are created with [`DragSession::new`].
#[derive(Clone, Debug)]
pub struct DragSession {
    tx: Arc<watch::Sender<Option<DragPayload>>>,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Publishes `payload` as the active drag, overwriting any previous one.
    pub fn set_active_drag(&self, payload: DragPayload) {
        tracing::trace!(kind = %payload.kind(), "Drag started");
        self.tx.send_replace(Some(payload));
    }

    /// Ends the active drag. Subscribers are only notified if one was active.
    pub fn clear_drag(&self) {
        self.tx.send_if_modified(|active| active.take().is_some());
    }

    pub fn active_drag(&self) -> Option<DragPayload> {
        self.tx.borrow().clone()
    }

    pub fn active_kind(&self) -> Option<DragKind> {
        self.tx.borrow().as_ref().map(DragPayload::kind)
    }

    pub fn is_dragging(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn state(&self) -> DragSessionState {
        let active_drag = self.active_drag();
        DragSessionState {
            is_dragging: active_drag.is_some(),
            active_drag,
        }
    }

    /// Receiver notified on every change of the active drag.
    pub fn subscribe(&self) -> watch::Receiver<Option<DragPayload>> {
        self.tx.subscribe()
    }
}

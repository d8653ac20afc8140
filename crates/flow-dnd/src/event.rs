//! # Drag Events
//!
//! The host-agnostic part of a native drag event that handlers and validators
//! get to see.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// State of keyboard modifiers (Shift, Ctrl, Alt, Meta).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiersState {
    /// Shift key is pressed.
    pub shift: bool,
    /// Ctrl key is pressed.
    pub ctrl: bool,
    /// Alt / Option key is pressed.
    pub alt: bool,
    /// Meta / Command / Windows key is pressed.
    pub meta: bool,
}

/// A drag event as delivered by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    /// Pointer position in client (screen) pixels.
    pub client: Vec2,
    /// Modifiers held while the event fired.
    pub modifiers: ModifiersState,
}

impl DragEvent {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            client: Vec2::new(x, y),
            modifiers: ModifiersState::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: ModifiersState) -> Self {
        self.modifiers = modifiers;
        self
    }
}

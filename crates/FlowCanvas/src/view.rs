//! # Viewport System
//!
//! This module handles the "infinite canvas" mathematics.
//! It provides utilities to transform between World Space (the infinite grid) and Screen Space (the pixels on the monitor).
//!
//! [`View`] is also the coordinate translator handed to the canvas drop zone,
//! so dropped items land under the cursor at any pan and zoom.

use flow_dnd::drop_zone::CoordinateSpace;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Represents the current camera state: where we are looking (Pan) and how close (Zoom).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// The translation offset of the canvas.
    /// A positive value moves the canvas right/down.
    pub pan: Vec2,
    /// The scale factor.
    /// - 1.0 = 100% scale.
    /// - Greater than 1.0 = Zoomed In.
    /// - Less than 1.0 = Zoomed Out.
    pub zoom: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// The View struct combines the Transform with the actual Viewport size (window size).
/// It serves as the single source of truth for coordinate conversions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// The camera transform.
    pub transform: Transform,
    /// The size of the visible area in pixels.
    pub viewport_size: Vec2,
    /// Top-left corner of the canvas element in client coordinates.
    #[serde(default)]
    pub origin: Vec2,
}

impl View {
    /// Creates a new View system.
    pub fn new(transform: Transform, viewport_size: Vec2) -> Self {
        Self {
            transform,
            viewport_size,
            origin: Vec2::ZERO,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Converts a point from **World Space** (infinite grid) to **Screen Space** (window pixels).
    ///
    /// Formula: `Screen = (World * Zoom) + Pan`
    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        (world_pos * self.transform.zoom) + self.transform.pan
    }

    /// Converts a point from **Screen Space** (window pixels) to **World Space** (infinite grid).
    ///
    /// Formula: `World = (Screen - Pan) / Zoom`
    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        (screen_pos - self.transform.pan) / self.transform.zoom
    }

    /// Converts client coordinates (relative to the window) to World Space.
    pub fn client_to_world(&self, client_pos: Vec2) -> Vec2 {
        self.screen_to_world(client_pos - self.origin)
    }
}

impl CoordinateSpace for View {
    fn to_local(&self, screen: Vec2) -> Vec2 {
        self.client_to_world(screen)
    }
}

/// A [`View`] shared between the host and the canvas drop zone.
///
/// The drop zone reads the camera at drop time, so pans and zooms made
/// mid-drag are honoured.
#[derive(Debug, Default)]
pub struct SharedView {
    inner: RwLock<View>,
}

impl SharedView {
    pub fn new(view: View) -> Self {
        Self {
            inner: RwLock::new(view),
        }
    }

    /// A copy of the current view.
    pub fn get(&self) -> View {
        match self.inner.read() {
            Ok(view) => *view,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut View)) {
        match self.inner.write() {
            Ok(mut view) => f(&mut view),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl CoordinateSpace for SharedView {
    fn to_local(&self, screen: Vec2) -> Vec2 {
        self.get().client_to_world(screen)
    }
}

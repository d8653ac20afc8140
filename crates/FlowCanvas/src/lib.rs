//! # FlowCanvas
//!
//! `flow_canvas` is the headless workflow graph that drag-and-drop lands in.
//! It owns the node/edge state, the stored templates and the camera, and
//! leaves rendering to the host application.
//!
//! ## Core Architecture
//! - **Model (`src/model.rs`)**: Stores the graph state in a flat arena (SlotMap).
//! - **View (`src/view.rs`)**: Handles coordinate transformation (World <-> Screen).
//! - **Store (`src/store.rs`)**: Bounded template collection with CRUD and search.
//! - **Insertion (`src/insertion.rs`)**: Materializes templates with fresh ids.
//! - **Drop (`src/drop.rs`)**: Routes accepted drag payloads into the graph.

pub mod config;
pub mod drop;
pub mod error;
pub mod insertion;
pub mod metadata;
pub mod model;
pub mod persistence;
pub mod store;
pub mod template;
pub mod view;

use flow_dnd::drop_zone::{DropZone, DropZoneConfig};
use flow_dnd::session::DragSession;
use glam::Vec2;
use metadata::MetadataLookup;
use model::GraphState;
use std::sync::{Arc, Mutex};
use store::TemplateStore;
use view::{SharedView, Transform, View};

// Re-exports for convenience
pub use config::CanvasConfig;
pub use drop::{CanvasDrop, CanvasDropHandler};
pub use insertion::{InsertTemplate, InsertedGraph, TemplateInserter, prepare_for_insertion};
pub use metadata::MetadataRegistry;
pub use template::{Template, TemplateEdge, TemplateNode};

/// The main entry point for the library.
///
/// The `Canvas` struct holds the shared state of one editor: graph, templates
/// and camera. It is intended to be instantiated once and reused; the handles
/// are cheap to clone into drop zones.
pub struct Canvas {
    /// Configuration settings.
    pub config: CanvasConfig,
    /// The Viewport system handling coordinate transforms.
    pub view: Arc<SharedView>,
    pub graph: Arc<tokio::sync::Mutex<GraphState>>,
    pub templates: Arc<Mutex<TemplateStore>>,
    metadata: Arc<dyn MetadataLookup>,
}

impl Canvas {
    /// Creates a new Canvas instance with the given configuration.
    pub fn new(config: CanvasConfig, metadata: Arc<dyn MetadataLookup>) -> Self {
        let templates = TemplateStore::with_capacity(config.template_capacity);
        Self {
            config,
            view: Arc::new(SharedView::new(View::new(
                Transform::default(),
                Vec2::new(800.0, 600.0),
            ))), // Default 800x600, user should update
            graph: Arc::new(tokio::sync::Mutex::new(GraphState::default())),
            templates: Arc::new(Mutex::new(templates)),
            metadata,
        }
    }

    /// Updates the viewport size (e.g., on window resize).
    ///
    /// This should be called whenever the host application's window or panel size changes.
    pub fn update_viewport_size(&self, size: Vec2) {
        self.view.update(|view| view.viewport_size = size);
    }

    /// Updates pan and zoom.
    pub fn set_transform(&self, transform: Transform) {
        self.view.update(|view| view.transform = transform);
    }

    /// Moves the canvas element within the window.
    pub fn set_origin(&self, origin: Vec2) {
        self.view.update(|view| view.origin = origin);
    }

    pub fn metadata(&self) -> &dyn MetadataLookup {
        &*self.metadata
    }

    /// The handler that applies drops to this canvas.
    pub fn drop_handler(&self) -> CanvasDropHandler {
        CanvasDropHandler::new(
            self.graph.clone(),
            self.templates.clone(),
            self.metadata.clone(),
            self.config.clone(),
        )
    }

    /// A drop zone covering the canvas.
    ///
    /// Drop positions are translated into world space through the live view.
    pub fn drop_zone(&self, session: DragSession) -> DropZone {
        DropZone::new(
            DropZoneConfig::accepting(drop::canvas_accepts()),
            session,
            Arc::new(self.drop_handler()),
        )
        .with_translator(self.view.clone())
    }
}

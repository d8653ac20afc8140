//! # FlowDnd
//!
//! `flow_dnd` is the drag-and-drop protocol of the workflow editor. It is
//! headless: the host forwards native drag events and a [`DataTransfer`]
//! implementation, and the crate decides what is being dragged and where it
//! may land.
//!
//! ## Core Architecture
//! - **Payload (`src/payload.rs`)**: The tagged union of everything draggable.
//! - **Codec (`src/codec.rs`)**: Unified wire format plus legacy fallback keys.
//! - **Session (`src/session.rs`)**: The one active drag, shared window-wide.
//! - **Draggable (`src/draggable.rs`)**: Drag sources and preview synthesis.
//! - **Drop Zone (`src/drop_zone.rs`)**: Hover tracking, acceptance, and drop delivery.

pub mod codec;
pub mod config;
pub mod draggable;
pub mod drop_zone;
pub mod error;
pub mod event;
pub mod payload;
pub mod session;
pub mod transfer;

// Re-exports for convenience
pub use config::DragConfig;
pub use draggable::{DragImage, DragImageDescriptor, Draggable};
pub use drop_zone::{
    CoordinateSpace, DropHandler, DropOutcome, DropZone, DropZoneConfig, DropZoneState,
    Validation,
};
pub use event::DragEvent;
pub use payload::{DragData, DragKind, DragMetadata, DragPayload};
pub use session::DragSession;
pub use transfer::{DataTransfer, MemoryTransfer};

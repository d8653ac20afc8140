use crate::transfer::VisualHandle;
use thiserror::Error;

/// Failures while building a custom drag preview.
///
/// These never abort a drag; the binding falls back to the native preview.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DragImageError {
    #[error("Host could not create drag preview: {0}")]
    CreateFailed(String),

    #[error("Drag preview element {0:?} could not be attached")]
    AttachFailed(VisualHandle),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("No nodes are selected")]
    EmptySelection,
    #[error("Template name must not be empty")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid template snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported template snapshot version {0}")]
    UnsupportedVersion(u32),
}

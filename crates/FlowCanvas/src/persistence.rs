use crate::error::PersistenceError;
use crate::store::TemplateStore;
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SNAPSHOT_VERSION: u32 = 1;

/// A serializable snapshot of the template store.
///
/// Templates are listed oldest first so eviction order survives a reload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedTemplates {
    pub version: u32,
    pub templates: Vec<Template>,
}

impl TemplateStore {
    /// Serializes the store into a `SavedTemplates` payload.
    pub fn save(&self) -> SavedTemplates {
        SavedTemplates {
            version: SNAPSHOT_VERSION,
            templates: self.list().to_vec(),
        }
    }

    /// Loads a `SavedTemplates` payload, REPLACING the current content.
    ///
    /// Dangling edges are pruned and the capacity bound is re-applied.
    pub fn load(&mut self, saved: SavedTemplates) -> Result<(), PersistenceError> {
        if saved.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(saved.version));
        }
        let count = saved.templates.len();
        self.replace_all(saved.templates);
        tracing::info!(loaded = count, kept = self.len(), "Loaded template snapshot");
        Ok(())
    }

    pub fn save_to_string(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(&self.save())?)
    }

    pub fn load_from_str(&mut self, json: &str) -> Result<(), PersistenceError> {
        let saved: SavedTemplates = serde_json::from_str(json)?;
        self.load(saved)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        std::fs::write(path, self.save_to_string()?)?;
        Ok(())
    }

    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let json = std::fs::read_to_string(path)?;
        self.load_from_str(&json)
    }
}

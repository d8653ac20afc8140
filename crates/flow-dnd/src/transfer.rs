//! # Drag Transport
//!
//! The native drag-and-drop carrier: a string store keyed by MIME-like type
//! names, a file list, and the effect negotiation fields.
//!
//! Hosts implement [`DataTransfer`] over whatever their platform hands them.
//! [`MemoryTransfer`] is the in-process implementation used by headless hosts
//! and tests.

use crate::payload::FileHandle;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Kind of an entry in the transport's item list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferItemKind {
    String,
    File,
}

/// Operations the drag source permits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectAllowed {
    None,
    Copy,
    CopyLink,
    CopyMove,
    Link,
    LinkMove,
    Move,
    All,
    #[default]
    Uninitialized,
}

impl EffectAllowed {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectAllowed::None => "none",
            EffectAllowed::Copy => "copy",
            EffectAllowed::CopyLink => "copyLink",
            EffectAllowed::CopyMove => "copyMove",
            EffectAllowed::Link => "link",
            EffectAllowed::LinkMove => "linkMove",
            EffectAllowed::Move => "move",
            EffectAllowed::All => "all",
            EffectAllowed::Uninitialized => "uninitialized",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let effect = match value {
            "none" => EffectAllowed::None,
            "copy" => EffectAllowed::Copy,
            "copyLink" => EffectAllowed::CopyLink,
            "copyMove" => EffectAllowed::CopyMove,
            "link" => EffectAllowed::Link,
            "linkMove" => EffectAllowed::LinkMove,
            "move" => EffectAllowed::Move,
            "all" => EffectAllowed::All,
            "uninitialized" => EffectAllowed::Uninitialized,
            _ => return None,
        };
        Some(effect)
    }

    /// The drop effect a target should advertise when it accepts the drag.
    ///
    /// Must be one the source allows, otherwise the host refuses the drop.
    pub fn preferred_drop_effect(&self) -> DropEffect {
        match self {
            EffectAllowed::None => DropEffect::None,
            EffectAllowed::Copy | EffectAllowed::CopyLink => DropEffect::Copy,
            EffectAllowed::Link => DropEffect::Link,
            EffectAllowed::CopyMove
            | EffectAllowed::LinkMove
            | EffectAllowed::Move
            | EffectAllowed::All
            | EffectAllowed::Uninitialized => DropEffect::Move,
        }
    }
}

/// Drop indicator shown to the user while hovering a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropEffect {
    #[default]
    None,
    Copy,
    Link,
    Move,
}

impl DropEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropEffect::None => "none",
            DropEffect::Copy => "copy",
            DropEffect::Link => "link",
            DropEffect::Move => "move",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(DropEffect::None),
            "copy" => Some(DropEffect::Copy),
            "link" => Some(DropEffect::Link),
            "move" => Some(DropEffect::Move),
            _ => None,
        }
    }
}

/// Opaque handle to a host-side visual element (a DOM node, a texture, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// The transport contract hosts must provide.
pub trait DataTransfer {
    /// Returns the string stored under `format`, if any.
    fn get_data(&self, format: &str) -> Option<String>;
    /// Stores `data` under `format`, replacing any previous value.
    fn set_data(&mut self, format: &str, data: &str);
    /// The formats currently carried, in insertion order.
    fn types(&self) -> Vec<String>;
    /// Item kinds, or `None` when the host cannot introspect items.
    fn item_kinds(&self) -> Option<Vec<TransferItemKind>>;
    /// Files carried by the drag.
    fn files(&self) -> Vec<FileHandle>;
    fn effect_allowed(&self) -> EffectAllowed;
    fn set_effect_allowed(&mut self, effect: EffectAllowed);
    fn drop_effect(&self) -> DropEffect;
    fn set_drop_effect(&mut self, effect: DropEffect);
    /// Replaces the drag preview with `image`, anchored at `offset`.
    fn set_drag_image(&mut self, image: VisualHandle, offset: Vec2);
}

/// In-memory transport.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransfer {
    entries: Vec<(String, String)>,
    files: Vec<FileHandle>,
    effect_allowed: EffectAllowed,
    drop_effect: DropEffect,
    drag_image: Option<(VisualHandle, Vec2)>,
    opaque_items: bool,
}

impl MemoryTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport carrying externally dragged files.
    pub fn with_files(files: Vec<FileHandle>) -> Self {
        Self {
            files,
            ..Default::default()
        }
    }

    /// Simulates a host that cannot report item kinds.
    pub fn without_item_kinds(mut self) -> Self {
        self.opaque_items = true;
        self
    }

    pub fn add_file(&mut self, file: FileHandle) {
        self.files.push(file);
    }

    pub fn clear_data(&mut self) {
        self.entries.clear();
    }

    pub fn drag_image(&self) -> Option<(VisualHandle, Vec2)> {
        self.drag_image
    }
}

impl DataTransfer for MemoryTransfer {
    fn get_data(&self, format: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(key, _)| key == format)
            .map(|(_, value)| value.clone())
    }

    fn set_data(&mut self, format: &str, data: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| key == format) {
            entry.1 = data.to_string();
        } else {
            self.entries.push((format.to_string(), data.to_string()));
        }
    }

    fn types(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    fn item_kinds(&self) -> Option<Vec<TransferItemKind>> {
        if self.opaque_items {
            return None;
        }
        let strings = self.entries.iter().map(|_| TransferItemKind::String);
        let files = self.files.iter().map(|_| TransferItemKind::File);
        Some(strings.chain(files).collect())
    }

    fn files(&self) -> Vec<FileHandle> {
        self.files.clone()
    }

    fn effect_allowed(&self) -> EffectAllowed {
        self.effect_allowed
    }

    fn set_effect_allowed(&mut self, effect: EffectAllowed) {
        self.effect_allowed = effect;
    }

    fn drop_effect(&self) -> DropEffect {
        self.drop_effect
    }

    fn set_drop_effect(&mut self, effect: DropEffect) {
        self.drop_effect = effect;
    }

    fn set_drag_image(&mut self, image: VisualHandle, offset: Vec2) {
        self.drag_image = Some((image, offset));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_data_overwrites_in_place() {
        let mut transfer = MemoryTransfer::new();
        transfer.set_data("a", "1");
        transfer.set_data("b", "2");
        transfer.set_data("a", "3");
        assert_eq!(transfer.types(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(transfer.get_data("a").as_deref(), Some("3"));
    }

    #[test]
    fn effect_names_match_native_strings() {
        assert_eq!(EffectAllowed::parse("copyMove"), Some(EffectAllowed::CopyMove));
        assert_eq!(EffectAllowed::LinkMove.as_str(), "linkMove");
        assert_eq!(DropEffect::parse("link"), Some(DropEffect::Link));
        assert_eq!(DropEffect::parse("bogus"), None);
    }

    #[test]
    fn preferred_drop_effect_respects_allowed() {
        assert_eq!(EffectAllowed::Copy.preferred_drop_effect(), DropEffect::Copy);
        assert_eq!(EffectAllowed::Move.preferred_drop_effect(), DropEffect::Move);
        assert_eq!(EffectAllowed::None.preferred_drop_effect(), DropEffect::None);
    }
}

//! # Configuration
//!
//! Tunables for drag sources.

use crate::transfer::EffectAllowed;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Configuration shared by the [`Draggable`](crate::draggable::Draggable) bindings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// Effect advertised when a binding does not set one. Default: `move`.
    #[serde(default = "default_effect_allowed")]
    pub effect_allowed: EffectAllowed,
    /// Largest edge of a synthesized thumbnail preview, in pixels. Default: 64.
    #[serde(default = "default_max_size")]
    pub drag_image_max_size: f32,
    /// Cursor offset of synthesized previews, in pixels. Default: (10, 10).
    #[serde(default = "default_offset")]
    pub drag_image_offset: Vec2,
}

fn default_effect_allowed() -> EffectAllowed {
    EffectAllowed::Move
}

fn default_max_size() -> f32 {
    64.0
}

fn default_offset() -> Vec2 {
    Vec2::new(10.0, 10.0)
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            effect_allowed: default_effect_allowed(),
            drag_image_max_size: default_max_size(),
            drag_image_offset: default_offset(),
        }
    }
}

impl DragConfig {
    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DragConfig::from_json(r#"{"effect_allowed":"copy"}"#).unwrap();
        assert_eq!(config.effect_allowed, EffectAllowed::Copy);
        assert_eq!(config.drag_image_max_size, 64.0);
        assert_eq!(config.drag_image_offset, Vec2::new(10.0, 10.0));
    }
}

//! # Configuration
//!
//! This module defines the configuration struct for the Canvas.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Configuration parameters for the Canvas.
///
/// These settings allow the host application to tune how templates are stored
/// and where inserted nodes land.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Maximum number of stored templates. Default: 100.
    #[serde(default = "default_template_capacity")]
    pub template_capacity: usize,
    /// Margin in pixels added after normalizing a template's origin. Default: 50.0.
    #[serde(default = "default_insertion_margin")]
    pub insertion_margin: f32,
    /// Layout size given to nodes created by drops and insertions.
    #[serde(default = "default_node_size")]
    pub default_node_size: Vec2,
}

fn default_template_capacity() -> usize {
    100
}

fn default_insertion_margin() -> f32 {
    50.0
}

fn default_node_size() -> Vec2 {
    Vec2::new(200.0, 100.0)
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            template_capacity: default_template_capacity(),
            insertion_margin: default_insertion_margin(),
            default_node_size: default_node_size(),
        }
    }
}

impl CanvasConfig {
    /// Parses a config, filling missing fields with their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CanvasConfig::from_json(r#"{"template_capacity": 5}"#).unwrap();
        assert_eq!(config.template_capacity, 5);
        assert_eq!(config.insertion_margin, 50.0);
        assert_eq!(config.default_node_size, Vec2::new(200.0, 100.0));
    }
}

//! Node metadata lookup.
//!
//! Every node created from a drop or a template insertion needs the metadata
//! for its type. A missing entry stops that one creation.

pub use flow_dnd::payload::NodeMetadata;
use std::collections::HashMap;

/// Resolves a node type tag to its metadata.
pub trait MetadataLookup: Send + Sync {
    fn get_metadata(&self, node_type: &str) -> Option<&NodeMetadata>;
}

/// In-memory metadata table, keyed by node type.
#[derive(Clone, Debug, Default)]
pub struct MetadataRegistry {
    entries: HashMap<String, NodeMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `metadata.node_type`.
    pub fn register(&mut self, metadata: NodeMetadata) {
        self.entries.insert(metadata.node_type.clone(), metadata);
    }

    pub fn with(mut self, metadata: NodeMetadata) -> Self {
        self.register(metadata);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataLookup for MetadataRegistry {
    fn get_metadata(&self, node_type: &str) -> Option<&NodeMetadata> {
        self.entries.get(node_type)
    }
}

pub const IMAGE_NODE: &str = "nodetool.constant.Image";
pub const AUDIO_NODE: &str = "nodetool.constant.Audio";
pub const VIDEO_NODE: &str = "nodetool.constant.Video";
pub const TEXT_NODE: &str = "nodetool.constant.Text";

/// Constant node type able to hold an asset of `content_type`.
pub fn node_type_for_content(content_type: &str) -> Option<&'static str> {
    let major = content_type.split('/').next()?;
    match major {
        "image" => Some(IMAGE_NODE),
        "audio" => Some(AUDIO_NODE),
        "video" => Some(VIDEO_NODE),
        "text" => Some(TEXT_NODE),
        _ => None,
    }
}

//! # Drag Payloads
//!
//! The closed set of things that can be dragged around the editor.
//!
//! A [`DragPayload`] is a tagged value: the [`DragKind`] decides the shape of the
//! payload body, and [`DragData`] encodes that pairing so consumers have to
//! match on the kind before they can touch the body.
//!
//! On the wire a payload is `{"kind": "...", "payload": ..., "metadata": ...}`.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Tag identifying the shape of a drag payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DragKind {
    CreateNode,
    CreateNodeFromTemplate,
    Asset,
    AssetsMultiple,
    File,
    Tab,
    CollectionFile,
    Pattern,
    OutputImage,
    /// A kind produced by a newer peer. Its payload is carried as raw JSON.
    Other(String),
}

impl DragKind {
    /// The wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            DragKind::CreateNode => "create-node",
            DragKind::CreateNodeFromTemplate => "create-node-from-template",
            DragKind::Asset => "asset",
            DragKind::AssetsMultiple => "assets-multiple",
            DragKind::File => "file",
            DragKind::Tab => "tab",
            DragKind::CollectionFile => "collection-file",
            DragKind::Pattern => "pattern",
            DragKind::OutputImage => "output-image",
            DragKind::Other(kind) => kind,
        }
    }

    /// Parses a wire name. Never fails: unknown names become [`DragKind::Other`].
    pub fn parse(kind: &str) -> Self {
        match kind {
            "create-node" => DragKind::CreateNode,
            "create-node-from-template" => DragKind::CreateNodeFromTemplate,
            "asset" => DragKind::Asset,
            "assets-multiple" => DragKind::AssetsMultiple,
            "file" => DragKind::File,
            "tab" => DragKind::Tab,
            "collection-file" => DragKind::CollectionFile,
            "pattern" => DragKind::Pattern,
            "output-image" => DragKind::OutputImage,
            other => DragKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DragKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DragKind {
    fn from(kind: &str) -> Self {
        DragKind::parse(kind)
    }
}

impl Serialize for DragKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DragKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let kind = String::deserialize(deserializer)?;
        Ok(DragKind::parse(&kind))
    }
}

/// Default value and name of a single node property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,
    #[serde(default)]
    pub default: Value,
}

/// Everything needed to create a node of a given type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub node_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub properties: Vec<PropertyMetadata>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl NodeMetadata {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            title: String::new(),
            description: None,
            namespace: String::new(),
            properties: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Builds the initial property bag from the declared defaults.
    pub fn default_properties(&self) -> Map<String, Value> {
        self.properties
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect()
    }
}

/// Reference to a stored node-selection template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A single asset from the asset browser.
///
/// Fields this crate does not model are kept in `extra` so a payload survives
/// a pass through an older build untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Asset {
    pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type: content_type.into(),
            get_url: None,
            name: None,
            thumb_url: None,
            extra: Map::new(),
        }
    }
}

/// A file handed over by the host, usually dragged in from outside the app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            path: None,
        }
    }
}

/// A file being moved into a collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFile {
    pub collection: String,
    pub file: FileHandle,
}

/// A reusable workflow pattern from the pattern library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An image produced by a node output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The body of a drag payload, one variant per [`DragKind`].
#[derive(Clone, Debug, PartialEq)]
pub enum DragData {
    CreateNode(NodeMetadata),
    CreateNodeFromTemplate(TemplateRef),
    Asset(Asset),
    AssetsMultiple(Vec<String>),
    File(FileHandle),
    Tab(String),
    CollectionFile(CollectionFile),
    Pattern(Pattern),
    OutputImage(OutputImage),
    Other { kind: String, payload: Value },
}

impl DragData {
    pub fn kind(&self) -> DragKind {
        match self {
            DragData::CreateNode(_) => DragKind::CreateNode,
            DragData::CreateNodeFromTemplate(_) => DragKind::CreateNodeFromTemplate,
            DragData::Asset(_) => DragKind::Asset,
            DragData::AssetsMultiple(_) => DragKind::AssetsMultiple,
            DragData::File(_) => DragKind::File,
            DragData::Tab(_) => DragKind::Tab,
            DragData::CollectionFile(_) => DragKind::CollectionFile,
            DragData::Pattern(_) => DragKind::Pattern,
            DragData::OutputImage(_) => DragKind::OutputImage,
            DragData::Other { kind, .. } => DragKind::Other(kind.clone()),
        }
    }

    /// Decodes a bare payload body for the given kind.
    pub fn from_parts(kind: &str, payload: Value) -> Result<Self, serde_json::Error> {
        let data = match DragKind::parse(kind) {
            DragKind::CreateNode => DragData::CreateNode(serde_json::from_value(payload)?),
            DragKind::CreateNodeFromTemplate => {
                DragData::CreateNodeFromTemplate(serde_json::from_value(payload)?)
            }
            DragKind::Asset => DragData::Asset(serde_json::from_value(payload)?),
            DragKind::AssetsMultiple => DragData::AssetsMultiple(serde_json::from_value(payload)?),
            DragKind::File => DragData::File(serde_json::from_value(payload)?),
            DragKind::Tab => DragData::Tab(serde_json::from_value(payload)?),
            DragKind::CollectionFile => DragData::CollectionFile(serde_json::from_value(payload)?),
            DragKind::Pattern => DragData::Pattern(serde_json::from_value(payload)?),
            DragKind::OutputImage => DragData::OutputImage(serde_json::from_value(payload)?),
            DragKind::Other(kind) => DragData::Other { kind, payload },
        };
        Ok(data)
    }
}

/// Serializes the bare body only, without the kind tag.
impl Serialize for DragData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DragData::CreateNode(meta) => meta.serialize(serializer),
            DragData::CreateNodeFromTemplate(template) => template.serialize(serializer),
            DragData::Asset(asset) => asset.serialize(serializer),
            DragData::AssetsMultiple(ids) => ids.serialize(serializer),
            DragData::File(file) => file.serialize(serializer),
            DragData::Tab(workflow_id) => workflow_id.serialize(serializer),
            DragData::CollectionFile(file) => file.serialize(serializer),
            DragData::Pattern(pattern) => pattern.serialize(serializer),
            DragData::OutputImage(image) => image.serialize(serializer),
            DragData::Other { payload, .. } => payload.serialize(serializer),
        }
    }
}

/// Informational extras attached to a drag. Never authoritative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// The tagged value carried by a drag gesture.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "WirePayload")]
pub struct DragPayload {
    pub data: DragData,
    pub metadata: Option<DragMetadata>,
}

impl DragPayload {
    pub fn new(data: DragData) -> Self {
        Self {
            data,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: DragMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn kind(&self) -> DragKind {
        self.data.kind()
    }

    pub fn create_node(metadata: NodeMetadata) -> Self {
        Self::new(DragData::CreateNode(metadata))
    }

    pub fn asset(asset: Asset) -> Self {
        Self::new(DragData::Asset(asset))
    }

    /// Multiple assets. `metadata.count` mirrors the list length.
    pub fn assets(ids: Vec<String>) -> Self {
        let count = ids.len();
        Self::new(DragData::AssetsMultiple(ids)).with_metadata(DragMetadata {
            count: Some(count),
            ..Default::default()
        })
    }

    pub fn file(file: FileHandle) -> Self {
        Self::new(DragData::File(file))
    }

    pub fn tab(workflow_id: impl Into<String>) -> Self {
        Self::new(DragData::Tab(workflow_id.into()))
    }
}

impl Serialize for DragPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.metadata.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("DragPayload", len)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("payload", &self.data)?;
        if let Some(metadata) = &self.metadata {
            state.serialize_field("metadata", metadata)?;
        }
        state.end()
    }
}

/// Untyped intermediate used while decoding the unified format.
#[derive(Deserialize)]
pub(crate) struct WirePayload {
    pub(crate) kind: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    metadata: Option<DragMetadata>,
}

impl TryFrom<WirePayload> for DragPayload {
    type Error = serde_json::Error;

    fn try_from(wire: WirePayload) -> Result<Self, Self::Error> {
        Ok(Self {
            data: DragData::from_parts(&wire.kind, wire.payload)?,
            metadata: wire.metadata,
        })
    }
}

//! # Canvas Drops
//!
//! Turns accepted drag payloads into graph mutations: a node from the node
//! menu, a stored template, or a constant node holding a dropped asset.

use crate::config::CanvasConfig;
use crate::insertion::{InsertedGraph, TemplateInserter};
use crate::metadata::{self, MetadataLookup};
use crate::model::{GraphState, Node, NodeData};
use crate::store::TemplateStore;
use async_trait::async_trait;
use flow_dnd::drop_zone::DropHandler;
use flow_dnd::event::DragEvent;
use flow_dnd::payload::{Asset, DragData, DragKind, DragPayload, NodeMetadata, OutputImage};
use glam::Vec2;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

/// Kinds the canvas knows how to place.
pub fn canvas_accepts() -> [DragKind; 4] {
    [
        DragKind::CreateNode,
        DragKind::CreateNodeFromTemplate,
        DragKind::Asset,
        DragKind::OutputImage,
    ]
}

/// What a drop did to the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CanvasDrop {
    NodeCreated(Uuid),
    TemplateInserted(InsertedGraph),
    Ignored,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// The canvas' [`DropHandler`].
pub struct CanvasDropHandler {
    graph: Arc<AsyncMutex<GraphState>>,
    templates: Arc<Mutex<TemplateStore>>,
    metadata: Arc<dyn MetadataLookup>,
    config: CanvasConfig,
    workflow_id: Option<String>,
}

impl CanvasDropHandler {
    pub fn new(
        graph: Arc<AsyncMutex<GraphState>>,
        templates: Arc<Mutex<TemplateStore>>,
        metadata: Arc<dyn MetadataLookup>,
        config: CanvasConfig,
    ) -> Self {
        Self {
            graph,
            templates,
            metadata,
            config,
            workflow_id: None,
        }
    }

    pub fn with_workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    /// Applies `payload` at world `position`.
    pub fn apply(
        &self,
        payload: &DragPayload,
        position: Vec2,
        graph: &mut GraphState,
        templates: &mut TemplateStore,
    ) -> CanvasDrop {
        match &payload.data {
            DragData::CreateNode(node_metadata) => {
                let node = self.build_node(node_metadata, position, node_metadata.default_properties());
                let uuid = node.uuid;
                graph.insert_node(node);
                CanvasDrop::NodeCreated(uuid)
            }
            DragData::CreateNodeFromTemplate(template) => {
                let mut inserter = TemplateInserter::new(&self.config).with_metadata(&*self.metadata);
                if let Some(workflow_id) = &self.workflow_id {
                    inserter = inserter.with_workflow(workflow_id);
                }
                match inserter.insert_from_store(templates, &template.template_id, position, graph) {
                    Ok(inserted) => CanvasDrop::TemplateInserted(inserted),
                    Err(e) => {
                        tracing::warn!(template_id = %template.template_id, error = %e, "Cannot insert template");
                        CanvasDrop::Ignored
                    }
                }
            }
            DragData::Asset(asset) => self.place_asset(&asset.content_type, asset_value(asset), position, graph),
            DragData::OutputImage(image) => {
                let content_type = image.content_type.as_deref().unwrap_or("image/png");
                self.place_asset(content_type, output_value(image), position, graph)
            }
            DragData::AssetsMultiple(_)
            | DragData::File(_)
            | DragData::Tab(_)
            | DragData::CollectionFile(_)
            | DragData::Pattern(_)
            | DragData::Other { .. } => {
                tracing::debug!(kind = %payload.kind(), "Canvas ignores this drag kind");
                CanvasDrop::Ignored
            }
        }
    }

    fn place_asset(&self, content_type: &str, value: Value, position: Vec2, graph: &mut GraphState) -> CanvasDrop {
        let Some(node_type) = metadata::node_type_for_content(content_type) else {
            tracing::debug!(content_type = %content_type, "No constant node for content type");
            return CanvasDrop::Ignored;
        };
        let Some(node_metadata) = self.metadata.get_metadata(node_type) else {
            tracing::warn!(node_type = %node_type, "No metadata for node type, skipping drop");
            return CanvasDrop::Ignored;
        };

        let mut properties = node_metadata.default_properties();
        properties.insert("value".to_string(), value);
        let node = self.build_node(node_metadata, position, properties);
        let uuid = node.uuid;
        graph.insert_node(node);
        CanvasDrop::NodeCreated(uuid)
    }

    fn build_node(
        &self,
        node_metadata: &NodeMetadata,
        position: Vec2,
        properties: serde_json::Map<String, Value>,
    ) -> Node {
        let mut data = NodeData::with_properties(properties);
        data.workflow_id = self.workflow_id.clone();
        Node::new(&node_metadata.node_type, position, self.config.default_node_size).with_data(data)
    }
}

#[async_trait]
impl DropHandler for CanvasDropHandler {
    async fn on_drop(&self, payload: DragPayload, _event: &DragEvent, position: Vec2) {
        let mut graph = self.graph.lock().await;
        let mut templates = lock(&self.templates);
        let outcome = self.apply(&payload, position, &mut graph, &mut templates);
        tracing::info!(kind = %payload.kind(), x = position.x, y = position.y, outcome = ?outcome, "Canvas drop");
    }
}

fn major_type(content_type: &str) -> &str {
    content_type.split('/').next().unwrap_or(content_type)
}

fn asset_value(asset: &Asset) -> Value {
    json!({
        "type": major_type(&asset.content_type),
        "asset_id": asset.id,
        "uri": asset.get_url.clone().unwrap_or_default(),
    })
}

fn output_value(image: &OutputImage) -> Value {
    json!({
        "type": "image",
        "uri": image.url,
    })
}

//! # Template Insertion
//!
//! Materializes templates into a graph at a chosen offset.
//!
//! Every insertion draws fresh uuids for all nodes and edges, so inserting
//! the same template twice yields two disjoint subgraphs. Connections are
//! remapped through a local `key -> uuid` table; a connection whose endpoint
//! does not resolve is skipped with a warning, never inserted dangling.
//! Nodes are emitted before edges.
//!
//! Two input shapes are supported:
//! - [`Template`], whose edges reference template-local node ids.
//! - [`InsertTemplate`], produced by [`prepare_for_insertion`], whose
//!   connections reference nodes by their stringified index and whose
//!   positions are already normalized to the template's own origin.

use crate::config::CanvasConfig;
use crate::error::StoreError;
use crate::metadata::MetadataLookup;
use crate::model::{Edge, GraphSink, Node, NodeData};
use crate::store::TemplateStore;
use crate::template::Template;
use glam::Vec2;
use std::collections::HashMap;
use uuid::Uuid;

/// A node of an [`InsertTemplate`], positioned relative to the template origin.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertNode {
    pub node_type: String,
    pub position: Vec2,
    pub data: NodeData,
}

/// A connection of an [`InsertTemplate`]; endpoints are indices into `nodes`.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertConnection {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl InsertConnection {
    pub fn between(source: usize, target: usize) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
            target_handle: None,
        }
    }
}

/// A template ready for insertion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InsertTemplate {
    /// Id of the stored template this was prepared from.
    pub template_id: Option<String>,
    pub nodes: Vec<InsertNode>,
    pub connections: Vec<InsertConnection>,
}

/// What an insertion produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsertedGraph {
    /// New node uuids, in template order.
    pub node_ids: Vec<Uuid>,
    /// New edge uuids, in template order.
    pub edge_ids: Vec<Uuid>,
    /// Nodes not created because their type has no metadata.
    pub skipped_nodes: usize,
    /// Connections not created because an endpoint did not resolve.
    pub skipped_edges: usize,
}

/// One node in the shape shared by both template formats.
struct NodeSpec<'t> {
    key: String,
    node_type: &'t str,
    position: Vec2,
    data: &'t NodeData,
}

struct EdgeSpec<'t> {
    source: &'t str,
    target: &'t str,
    source_handle: Option<&'t String>,
    target_handle: Option<&'t String>,
}

/// Inserts templates into a [`GraphSink`].
#[derive(Clone, Copy)]
pub struct TemplateInserter<'a> {
    metadata: Option<&'a dyn MetadataLookup>,
    workflow_id: Option<&'a str>,
    node_size: Vec2,
    margin: f32,
}

impl<'a> TemplateInserter<'a> {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            metadata: None,
            workflow_id: None,
            node_size: config.default_node_size,
            margin: config.insertion_margin,
        }
    }

    /// Requires every node type to resolve in `metadata`.
    pub fn with_metadata(mut self, metadata: &'a dyn MetadataLookup) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Stamps inserted nodes with the owning workflow.
    pub fn with_workflow(mut self, workflow_id: &'a str) -> Self {
        self.workflow_id = Some(workflow_id);
        self
    }

    /// Inserts `template` with every node translated by `offset`.
    pub fn insert(&self, template: &Template, offset: Vec2, sink: &mut dyn GraphSink) -> InsertedGraph {
        let nodes = template.nodes.iter().map(|node| NodeSpec {
            key: node.id.clone(),
            node_type: &node.node_type,
            position: node.position,
            data: &node.data,
        });
        let edges = template.edges.iter().map(|edge| EdgeSpec {
            source: &edge.source,
            target: &edge.target,
            source_handle: edge.source_handle.as_ref(),
            target_handle: edge.target_handle.as_ref(),
        });
        self.materialize(&template.id, nodes, edges, offset, sink)
    }

    /// Inserts a prepared template with every node translated by `offset`.
    pub fn insert_prepared(
        &self,
        template: &InsertTemplate,
        offset: Vec2,
        sink: &mut dyn GraphSink,
    ) -> InsertedGraph {
        let nodes = template.nodes.iter().enumerate().map(|(i, node)| NodeSpec {
            key: i.to_string(),
            node_type: &node.node_type,
            position: node.position,
            data: &node.data,
        });
        let edges = template.connections.iter().map(|conn| EdgeSpec {
            source: &conn.source,
            target: &conn.target,
            source_handle: conn.source_handle.as_ref(),
            target_handle: conn.target_handle.as_ref(),
        });
        let label = template.template_id.as_deref().unwrap_or("<prepared>");
        self.materialize(label, nodes, edges, offset, sink)
    }

    /// Prepares the stored template `template_id` and inserts it at `offset`.
    ///
    /// Counts as one usage of the template, even if it has no nodes.
    pub fn insert_from_store(
        &self,
        store: &mut TemplateStore,
        template_id: &str,
        offset: Vec2,
        sink: &mut dyn GraphSink,
    ) -> Result<InsertedGraph, StoreError> {
        let prepared = prepare_for_insertion(store, template_id, self.margin)?;
        Ok(self.insert_prepared(&prepared, offset, sink))
    }

    fn materialize<'t>(
        &self,
        template_id: &str,
        nodes: impl Iterator<Item = NodeSpec<'t>>,
        edges: impl Iterator<Item = EdgeSpec<'t>>,
        offset: Vec2,
        sink: &mut dyn GraphSink,
    ) -> InsertedGraph {
        let mut result = InsertedGraph::default();
        let mut id_map: HashMap<String, Uuid> = HashMap::new();
        let mut new_nodes = Vec::new();

        for spec in nodes {
            if let Some(metadata) = self.metadata
                && metadata.get_metadata(spec.node_type).is_none()
            {
                tracing::warn!(
                    template_id = %template_id,
                    node_type = %spec.node_type,
                    "No metadata for node type, skipping node"
                );
                result.skipped_nodes += 1;
                continue;
            }

            let mut data = spec.data.clone();
            if let Some(workflow_id) = self.workflow_id {
                data.workflow_id = Some(workflow_id.to_string());
            }
            let node = Node::new(spec.node_type, spec.position + offset, self.node_size).with_data(data);
            id_map.insert(spec.key, node.uuid);
            result.node_ids.push(node.uuid);
            new_nodes.push(node);
        }

        let mut new_edges = Vec::new();
        for spec in edges {
            let (Some(&source), Some(&target)) = (id_map.get(spec.source), id_map.get(spec.target))
            else {
                tracing::warn!(
                    template_id = %template_id,
                    source = %spec.source,
                    target = %spec.target,
                    "Skipping connection with an unresolved endpoint"
                );
                result.skipped_edges += 1;
                continue;
            };
            let edge = Edge::new(source, target)
                .with_handles(spec.source_handle.cloned(), spec.target_handle.cloned());
            result.edge_ids.push(edge.uuid);
            new_edges.push(edge);
        }

        for node in new_nodes {
            sink.add_node(node);
        }
        for edge in new_edges {
            sink.add_edge(edge);
        }

        tracing::debug!(
            template_id = %template_id,
            nodes = result.node_ids.len(),
            edges = result.edge_ids.len(),
            "Inserted template"
        );
        result
    }
}

/// Converts the stored template `template_id` into an [`InsertTemplate`].
///
/// Positions are shifted so the template's smallest x/y sits at
/// `(margin, margin)`. The template's usage count is bumped once per call.
pub fn prepare_for_insertion(
    store: &mut TemplateStore,
    template_id: &str,
    margin: f32,
) -> Result<InsertTemplate, StoreError> {
    let template = store
        .get_mut(template_id)
        .ok_or_else(|| StoreError::NotFound(template_id.to_string()))?;

    let shift = Vec2::splat(margin) - template.origin().unwrap_or(Vec2::ZERO);
    let index = template.node_index();

    let nodes = template
        .nodes
        .iter()
        .map(|node| InsertNode {
            node_type: node.node_type.clone(),
            position: node.position + shift,
            data: node.data.clone(),
        })
        .collect();

    let mut connections = Vec::with_capacity(template.edges.len());
    for edge in &template.edges {
        let (Some(&source), Some(&target)) =
            (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
        else {
            tracing::warn!(
                template_id = %template_id,
                source = %edge.source,
                target = %edge.target,
                "Dropping template edge with a missing endpoint"
            );
            continue;
        };
        connections.push(InsertConnection {
            source: source.to_string(),
            target: target.to_string(),
            source_handle: edge.source_handle.clone(),
            target_handle: edge.target_handle.clone(),
        });
    }

    template.record_usage();

    Ok(InsertTemplate {
        template_id: Some(template.id.clone()),
        nodes,
        connections,
    })
}

//! # Core Data Models
//!
//! This module defines the workflow graph that drops and template insertions
//! write into.
//! It uses `SlotMap` for efficient, safe, and stable entity storage without pointers.
//!
//! Nodes and edges also carry a stable `Uuid`; edges reference nodes by that
//! uuid so a graph survives being snapshotted and reloaded.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use slotmap::SlotMap;
use slotmap::new_key_type;
use std::collections::HashMap;

pub use uuid::Uuid;

new_key_type! {
    /// Unique identifier for a Node.
    pub struct NodeId;
    /// Unique identifier for an Edge.
    pub struct EdgeId;
}

bitflags! {
    /// Bitflags representing various boolean states of a Node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// The node cannot be moved or deleted.
        const LOCKED = 1 << 0;
        /// The node is not rendered.
        const HIDDEN = 1 << 1;
        /// The node is currently selected by the user.
        const SELECTED = 1 << 2;
    }
}

// Manual Serialize/Deserialize implementation for bitflags to be friendly
impl Serialize for NodeFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for NodeFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

/// The property bag of a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default = "default_selectable")]
    pub selectable: bool,
    #[serde(default)]
    pub dynamic_properties: Map<String, Value>,
    /// Workflow the node belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

fn default_selectable() -> bool {
    true
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            properties: Map::new(),
            selectable: true,
            dynamic_properties: Map::new(),
            workflow_id: None,
        }
    }
}

impl NodeData {
    pub fn with_properties(properties: Map<String, Value>) -> Self {
        Self {
            properties,
            ..Default::default()
        }
    }
}

/// A Node in the graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Self-reference ID.
    pub id: NodeId,
    /// Stable UUID, referenced by edges.
    pub uuid: Uuid,
    /// Registry type of the node, e.g. `nodetool.constant.Image`.
    pub node_type: String,
    /// World-space position of the top-left corner.
    pub position: Vec2,
    /// Size of the node layout.
    pub size: Vec2,
    pub data: NodeData,
    /// State flags.
    pub flags: NodeFlags,
}

impl Node {
    /// A fresh node with a new uuid. `id` is assigned on insertion.
    pub fn new(node_type: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            id: NodeId::default(),
            uuid: Uuid::new_v4(),
            node_type: node_type.into(),
            position,
            size,
            data: NodeData::default(),
            flags: NodeFlags::default(),
        }
    }

    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    pub fn is_selected(&self) -> bool {
        self.flags.contains(NodeFlags::SELECTED)
    }
}

/// A connection between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Self-reference ID.
    pub id: EdgeId,
    pub uuid: Uuid,
    /// Source node uuid.
    pub source: Uuid,
    /// Target node uuid.
    pub target: Uuid,
    /// Output slot on the source node.
    pub source_handle: Option<String>,
    /// Input slot on the target node.
    pub target_handle: Option<String>,
}

impl Edge {
    pub fn new(source: Uuid, target: Uuid) -> Self {
        Self {
            id: EdgeId::default(),
            uuid: Uuid::new_v4(),
            source,
            target,
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(mut self, source: Option<String>, target: Option<String>) -> Self {
        self.source_handle = source;
        self.target_handle = target;
        self
    }
}

/// The node/edge mutators consumed by template insertion and drop handling.
pub trait GraphSink {
    fn add_node(&mut self, node: Node);
    fn add_edge(&mut self, edge: Edge);
}

/// The entire state of the Graph.
///
/// This struct holds all entities (Nodes, Edges) in flat Arenas (`SlotMap`).
/// It is responsible for data storage, but not for rendering or interaction logic.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphState {
    /// Arena for Nodes.
    pub nodes: SlotMap<NodeId, Node>,
    /// Arena for Edges.
    pub edges: SlotMap<EdgeId, Edge>,
    /// Draw order cache.
    /// Lower index = Background/Bottom.
    /// Higher index = Foreground/Top.
    pub draw_order: Vec<NodeId>,
    /// Index for O(1) UUID to NodeId lookup.
    #[serde(default, skip)]
    pub uuid_index: HashMap<Uuid, NodeId>,
}

impl GraphState {
    /// Inserts a node and updates the UUID index.
    ///
    /// A node whose uuid is already present replaces the existing one.
    pub fn insert_node(&mut self, mut node: Node) -> NodeId {
        if let Some(&existing) = self.uuid_index.get(&node.uuid)
            && let Some(slot) = self.nodes.get_mut(existing)
        {
            node.id = existing;
            *slot = node;
            return existing;
        }

        let id = self.nodes.insert_with_key(|key| {
            node.id = key;
            node
        });
        let uuid = self.nodes[id].uuid;
        self.uuid_index.insert(uuid, id);
        self.draw_order.push(id);
        id
    }

    /// Removes a node, its edges, and updates the UUID index.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(id)?;
        self.uuid_index.remove(&node.uuid);
        self.draw_order.retain(|&n| n != id);
        self.edges
            .retain(|_, edge| edge.source != node.uuid && edge.target != node.uuid);
        Some(node)
    }

    /// Inserts an edge. Re-adding an edge uuid replaces the previous edge.
    pub fn insert_edge(&mut self, mut edge: Edge) -> EdgeId {
        if let Some((existing, slot)) = self.edges.iter_mut().find(|(_, e)| e.uuid == edge.uuid) {
            edge.id = existing;
            *slot = edge;
            return existing;
        }
        self.edges.insert_with_key(|key| {
            edge.id = key;
            edge
        })
    }

    pub fn node_by_uuid(&self, uuid: Uuid) -> Option<&Node> {
        self.uuid_index.get(&uuid).and_then(|&id| self.nodes.get(id))
    }

    pub fn edge_by_uuid(&self, uuid: Uuid) -> Option<&Edge> {
        self.edges.values().find(|edge| edge.uuid == uuid)
    }

    /// Rebuilds the UUID index, e.g. after deserializing.
    pub fn rebuild_index(&mut self) {
        self.uuid_index = self
            .nodes
            .iter()
            .map(|(id, node)| (node.uuid, id))
            .collect();
    }

    pub fn select(&mut self, uuid: Uuid) -> bool {
        let Some(&id) = self.uuid_index.get(&uuid) else {
            return false;
        };
        match self.nodes.get_mut(id) {
            Some(node) if node.data.selectable => {
                node.flags.insert(NodeFlags::SELECTED);
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        for (_, node) in &mut self.nodes {
            node.flags.remove(NodeFlags::SELECTED);
        }
    }

    /// Selected nodes in draw order.
    pub fn selected_nodes(&self) -> Vec<&Node> {
        self.draw_order
            .iter()
            .filter_map(|&id| self.nodes.get(id))
            .filter(|node| node.is_selected())
            .collect()
    }
}

impl GraphSink for GraphState {
    fn add_node(&mut self, node: Node) {
        self.insert_node(node);
    }

    fn add_edge(&mut self, edge: Edge) {
        self.insert_edge(edge);
    }
}

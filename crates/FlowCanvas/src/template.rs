//! # Templates
//!
//! A template is a reusable snapshot of a node/edge subgraph. Node ids are
//! local to the template; edges reference them by that id.

use crate::model::{GraphState, NodeData};
use chrono::{DateTime, Utc};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateNode {
    /// Template-local id.
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Vec2,
    #[serde(default)]
    pub data: NodeData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl TemplateEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_handle = Some(source.into());
        self.target_handle = Some(target.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<TemplateNode>,
    #[serde(default)]
    pub edges: Vec<TemplateEdge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub usage_count: u64,
}

impl Template {
    /// An empty template with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            tags: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
            usage_count: 0,
        }
    }

    pub fn with_node(mut self, id: impl Into<String>, node_type: impl Into<String>, position: Vec2) -> Self {
        self.nodes.push(TemplateNode {
            id: id.into(),
            node_type: node_type.into(),
            position,
            data: NodeData::default(),
        });
        self
    }

    pub fn with_edge(mut self, edge: TemplateEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Builds a template from `node_ids` of `graph`.
    ///
    /// Only edges with both endpoints inside the captured set are kept.
    pub fn from_graph(name: impl Into<String>, graph: &GraphState, node_ids: &[Uuid]) -> Self {
        let mut template = Self::new(name);
        let captured: HashSet<Uuid> = node_ids.iter().copied().collect();

        for uuid in node_ids {
            if let Some(node) = graph.node_by_uuid(*uuid) {
                template.nodes.push(TemplateNode {
                    id: node.uuid.to_string(),
                    node_type: node.node_type.clone(),
                    position: node.position,
                    data: node.data.clone(),
                });
            }
        }

        for edge in graph.edges.values() {
            if captured.contains(&edge.source) && captured.contains(&edge.target) {
                template.edges.push(TemplateEdge {
                    source: edge.source.to_string(),
                    target: edge.target.to_string(),
                    source_handle: edge.source_handle.clone(),
                    target_handle: edge.target_handle.clone(),
                });
            }
        }
        template
    }

    /// Position of each node id in `nodes`.
    pub fn node_index(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect()
    }

    /// Drops edges whose endpoints are not nodes of this template.
    ///
    /// Returns the number of edges removed.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let known: HashSet<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        let before = self.edges.len();
        let template_id = self.id.clone();

        self.edges.retain(|edge| {
            let keep = known.contains(&edge.source) && known.contains(&edge.target);
            if !keep {
                tracing::warn!(
                    template_id = %template_id,
                    source = %edge.source,
                    target = %edge.target,
                    "Dropping template edge with a missing endpoint"
                );
            }
            keep
        });
        before - self.edges.len()
    }

    /// Smallest x and y across all nodes. `None` for an empty template.
    pub fn origin(&self) -> Option<Vec2> {
        self.nodes
            .iter()
            .map(|n| n.position)
            .reduce(|a, b| a.min(b))
    }

    /// Counts one insertion.
    pub fn record_usage(&mut self) {
        self.usage_count += 1;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_keeps_only_resolvable_edges() {
        let mut template = Template::new("t")
            .with_node("a", "A", Vec2::ZERO)
            .with_node("b", "B", Vec2::ZERO)
            .with_edge(TemplateEdge::new("a", "b"))
            .with_edge(TemplateEdge::new("a", "ghost"));

        assert_eq!(template.prune_dangling_edges(), 1);
        assert_eq!(template.edges, vec![TemplateEdge::new("a", "b")]);
    }

    #[test]
    fn origin_is_componentwise_minimum() {
        let template = Template::new("t")
            .with_node("a", "A", Vec2::new(300.0, 40.0))
            .with_node("b", "B", Vec2::new(120.0, 90.0));
        assert_eq!(template.origin(), Some(Vec2::new(120.0, 40.0)));
        assert_eq!(Template::new("empty").origin(), None);
    }

    #[test]
    fn wire_names() {
        let template = Template::new("t").with_node("a", "nodetool.text.Concat", Vec2::ZERO);
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["nodes"][0]["type"], "nodetool.text.Concat");
        assert_eq!(json["usageCount"], 0);
        assert!(json.get("createdAt").is_some());
    }
}

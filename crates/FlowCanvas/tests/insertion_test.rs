use flow_canvas::insertion::{InsertConnection, InsertNode, InsertTemplate, TemplateInserter, prepare_for_insertion};
use flow_canvas::metadata::{MetadataRegistry, NodeMetadata};
use flow_canvas::model::{GraphState, NodeData};
use flow_canvas::store::TemplateStore;
use flow_canvas::{CanvasConfig, Template, TemplateEdge};
use glam::Vec2;
use serde_json::json;
use std::collections::HashSet;

fn two_node_template() -> Template {
    Template::new("Pair")
        .with_node("A", "nodetool.text.Concat", Vec2::new(0.0, 0.0))
        .with_node("B", "nodetool.output.Text", Vec2::new(100.0, 100.0))
        .with_edge(TemplateEdge::new("A", "B").with_handles("output", "value"))
}

#[test]
fn test_insert_at_offset_remaps_ids() {
    // 1. Template [A@(0,0), B@(100,100)], A -> B, inserted at (50,50)
    let template = two_node_template();
    let config = CanvasConfig::default();
    let mut graph = GraphState::default();

    let inserted = TemplateInserter::new(&config).insert(&template, Vec2::new(50.0, 50.0), &mut graph);

    // 2. Two nodes at the offset positions
    assert_eq!(inserted.node_ids.len(), 2);
    let a = graph.node_by_uuid(inserted.node_ids[0]).unwrap();
    let b = graph.node_by_uuid(inserted.node_ids[1]).unwrap();
    assert_eq!(a.position, Vec2::new(50.0, 50.0));
    assert_eq!(b.position, Vec2::new(150.0, 150.0));
    assert_eq!(a.node_type, "nodetool.text.Concat");

    // 3. One edge between the NEW ids, handles preserved
    assert_eq!(inserted.edge_ids.len(), 1);
    let edge = graph.edge_by_uuid(inserted.edge_ids[0]).unwrap();
    assert_eq!(edge.source, a.uuid);
    assert_eq!(edge.target, b.uuid);
    assert_eq!(edge.source_handle.as_deref(), Some("output"));
    assert_eq!(edge.target_handle.as_deref(), Some("value"));
    assert_ne!(edge.source.to_string(), "A");
}

#[test]
fn test_repeated_insertion_is_disjoint() {
    let template = two_node_template();
    let config = CanvasConfig::default();
    let inserter = TemplateInserter::new(&config);
    let mut graph = GraphState::default();

    let first = inserter.insert(&template, Vec2::ZERO, &mut graph);
    let second = inserter.insert(&template, Vec2::ZERO, &mut graph);

    let first_nodes: HashSet<_> = first.node_ids.iter().collect();
    let first_edges: HashSet<_> = first.edge_ids.iter().collect();
    assert!(second.node_ids.iter().all(|id| !first_nodes.contains(id)));
    assert!(second.edge_ids.iter().all(|id| !first_edges.contains(id)));
    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 2);
}

#[test]
fn test_inserted_data_is_a_copy() {
    let mut template = two_node_template();
    template.nodes[0]
        .data
        .properties
        .insert("a".to_string(), json!("hello"));
    let config = CanvasConfig::default();
    let mut graph = GraphState::default();

    let inserted = TemplateInserter::new(&config).insert(&template, Vec2::ZERO, &mut graph);

    // Mutating the inserted node leaves the template untouched
    let id = graph.uuid_index[&inserted.node_ids[0]];
    graph.nodes[id]
        .data
        .properties
        .insert("a".to_string(), json!("changed"));
    assert_eq!(template.nodes[0].data.properties["a"], json!("hello"));
}

#[test]
fn test_dangling_connection_is_skipped() {
    // 1. Prepared template whose second connection points at index 5
    let prepared = InsertTemplate {
        template_id: None,
        nodes: vec![
            InsertNode {
                node_type: "A".to_string(),
                position: Vec2::ZERO,
                data: NodeData::default(),
            },
            InsertNode {
                node_type: "B".to_string(),
                position: Vec2::new(10.0, 0.0),
                data: NodeData::default(),
            },
        ],
        connections: vec![InsertConnection::between(0, 1), InsertConnection::between(0, 5)],
    };
    let config = CanvasConfig::default();
    let mut graph = GraphState::default();

    // 2. Insert
    let inserted = TemplateInserter::new(&config).insert_prepared(&prepared, Vec2::ZERO, &mut graph);

    // 3. Everything else still lands
    assert_eq!(inserted.node_ids.len(), 2);
    assert_eq!(inserted.edge_ids.len(), 1);
    assert_eq!(inserted.skipped_edges, 1);
    assert_eq!(graph.edges.len(), 1);
}

#[test]
fn test_missing_metadata_skips_only_that_node() {
    let template = two_node_template();
    let config = CanvasConfig::default();
    let registry = MetadataRegistry::new().with(NodeMetadata::new("nodetool.text.Concat"));
    let mut graph = GraphState::default();

    let inserted = TemplateInserter::new(&config)
        .with_metadata(&registry)
        .insert(&template, Vec2::ZERO, &mut graph);

    // B has no metadata, so the A -> B edge cannot resolve either
    assert_eq!(inserted.node_ids.len(), 1);
    assert_eq!(inserted.skipped_nodes, 1);
    assert_eq!(inserted.skipped_edges, 1);
    assert!(graph.edges.is_empty());
}

#[test]
fn test_workflow_is_stamped() {
    let template = two_node_template();
    let config = CanvasConfig::default();
    let mut graph = GraphState::default();

    let inserted = TemplateInserter::new(&config)
        .with_workflow("wf-1")
        .insert(&template, Vec2::ZERO, &mut graph);

    for id in inserted.node_ids {
        let node = graph.node_by_uuid(id).unwrap();
        assert_eq!(node.data.workflow_id.as_deref(), Some("wf-1"));
    }
}

#[test]
fn test_prepare_normalizes_to_margin() {
    // 1. Template authored far from the origin
    let template = Template::new("Far")
        .with_node("A", "A", Vec2::new(400.0, 300.0))
        .with_node("B", "B", Vec2::new(600.0, 250.0))
        .with_edge(TemplateEdge::new("B", "A"));
    let mut store = TemplateStore::new();
    let id = store.add(template);

    // 2. Prepare with a 50px margin
    let prepared = prepare_for_insertion(&mut store, &id, 50.0).unwrap();

    // 3. Min x/y lands on the margin
    assert_eq!(prepared.nodes[0].position, Vec2::new(50.0, 100.0));
    assert_eq!(prepared.nodes[1].position, Vec2::new(250.0, 50.0));
    assert_eq!(prepared.connections, vec![InsertConnection::between(1, 0)]);
    assert_eq!(prepared.template_id.as_deref(), Some(id.as_str()));
}

#[test]
fn test_usage_counts_once_per_prepare() {
    let mut store = TemplateStore::new();
    let id = store.add(two_node_template());
    let empty = store.add(Template::new("Empty"));

    prepare_for_insertion(&mut store, &id, 50.0).unwrap();
    prepare_for_insertion(&mut store, &id, 50.0).unwrap();
    let prepared = prepare_for_insertion(&mut store, &empty, 50.0).unwrap();

    assert_eq!(store.get(&id).unwrap().usage_count, 2);
    // Zero nodes still counts as an insertion
    assert!(prepared.nodes.is_empty());
    assert_eq!(store.get(&empty).unwrap().usage_count, 1);
}

#[test]
fn test_usage_bumps_updated_at() {
    let mut store = TemplateStore::new();
    let id = store.add(two_node_template());
    let before = store.get(&id).unwrap().updated_at;

    prepare_for_insertion(&mut store, &id, 0.0).unwrap();

    assert!(store.get(&id).unwrap().updated_at >= before);
}

#[test]
fn test_insert_from_store() {
    let config = CanvasConfig::default();
    let mut store = TemplateStore::new();
    let id = store.add(
        Template::new("Shifted")
            .with_node("A", "A", Vec2::new(1000.0, 1000.0))
            .with_node("B", "B", Vec2::new(1100.0, 1100.0))
            .with_edge(TemplateEdge::new("A", "B")),
    );
    let mut graph = GraphState::default();

    let inserted = TemplateInserter::new(&config)
        .insert_from_store(&mut store, &id, Vec2::new(10.0, 20.0), &mut graph)
        .unwrap();

    // Normalized to (margin, margin), then shifted by the drop position
    let a = graph.node_by_uuid(inserted.node_ids[0]).unwrap();
    assert_eq!(a.position, Vec2::new(60.0, 70.0));
    assert_eq!(inserted.edge_ids.len(), 1);
    assert_eq!(store.get(&id).unwrap().usage_count, 1);

    assert!(
        TemplateInserter::new(&config)
            .insert_from_store(&mut store, "missing", Vec2::ZERO, &mut graph)
            .is_err()
    );
}

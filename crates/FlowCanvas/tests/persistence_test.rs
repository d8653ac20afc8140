use flow_canvas::error::PersistenceError;
use flow_canvas::persistence::{SNAPSHOT_VERSION, SavedTemplates};
use flow_canvas::store::TemplateStore;
use flow_canvas::{Template, TemplateEdge};
use glam::Vec2;
use serde_json::json;

fn sample_store() -> TemplateStore {
    let mut store = TemplateStore::new();
    let mut template = Template::new("Pair")
        .with_node("a", "nodetool.text.Concat", Vec2::new(0.0, 0.0))
        .with_node("b", "nodetool.output.Text", Vec2::new(100.0, 50.0))
        .with_edge(TemplateEdge::new("a", "b").with_handles("output", "value"));
    template.nodes[0]
        .data
        .properties
        .insert("a".to_string(), json!("hi"));
    template.tags = vec!["text".to_string()];
    store.add(template);
    store.add(Template::new("Empty"));
    store
}

#[test]
fn test_roundtrip_persistence() {
    // 1. Save
    let store = sample_store();
    let json = store.save_to_string().unwrap();

    // 2. Load into NEW store
    let mut loaded = TemplateStore::new();
    loaded.load_from_str(&json).unwrap();

    // 3. Same templates, same order
    assert_eq!(loaded.list(), store.list());
}

#[test]
fn test_unknown_version_is_rejected() {
    let mut store = sample_store();
    let saved = SavedTemplates {
        version: SNAPSHOT_VERSION + 1,
        templates: Vec::new(),
    };

    let result = store.load(saved);

    assert!(matches!(result, Err(PersistenceError::UnsupportedVersion(_))));
    // Current content untouched
    assert_eq!(store.len(), 2);
}

#[test]
fn test_malformed_json_is_rejected() {
    let mut store = TemplateStore::new();
    assert!(matches!(store.load_from_str("{"), Err(PersistenceError::Json(_))));
}

#[test]
fn test_load_prunes_and_applies_capacity() {
    // 1. Snapshot with three templates, one holding a dangling edge
    let broken = Template::new("Broken")
        .with_node("a", "A", Vec2::ZERO)
        .with_edge(TemplateEdge::new("a", "missing"));
    let saved = SavedTemplates {
        version: SNAPSHOT_VERSION,
        templates: vec![Template::new("Old"), Template::new("Mid"), broken],
    };

    // 2. Load into a store of capacity 2
    let mut store = TemplateStore::with_capacity(2);
    store.load(saved).unwrap();

    // 3. Oldest evicted, dangling edge dropped
    let names: Vec<&str> = store.list().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Mid", "Broken"]);
    assert!(store.list()[1].edges.is_empty());
}

#[test]
fn test_file_roundtrip() {
    let store = sample_store();
    let path = std::env::temp_dir().join(format!("flow_canvas_templates_{}.json", std::process::id()));

    store.save_to_path(&path).unwrap();
    let mut loaded = TemplateStore::new();
    loaded.load_from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.list(), store.list());

    let missing = loaded.load_from_path(path.with_extension("absent"));
    assert!(matches!(missing, Err(PersistenceError::Io(_))));
}

use flow_dnd::codec::{self, DRAG_DATA_MIME, legacy};
use flow_dnd::payload::{
    Asset, CollectionFile, DragData, DragKind, DragMetadata, DragPayload, FileHandle,
    NodeMetadata, OutputImage, Pattern, PropertyMetadata, TemplateRef,
};
use flow_dnd::transfer::{DataTransfer, MemoryTransfer};
use serde_json::json;

/// Routes the codec's debug diagnostics to the test output.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn image_asset() -> Asset {
    let mut asset = Asset::new("a1", "image/png");
    asset.get_url = Some("https://x/y.png".to_string());
    asset
        .extra
        .insert("parent_id".to_string(), json!("folder-7"));
    asset
}

fn sample_payloads() -> Vec<DragPayload> {
    let mut metadata = NodeMetadata::new("nodetool.text.Concat");
    metadata.title = "Concat".to_string();
    metadata.properties.push(PropertyMetadata {
        name: "a".to_string(),
        default: json!(""),
    });

    let mut pattern = Pattern {
        id: "rag-basic".to_string(),
        name: Some("Basic RAG".to_string()),
        extra: Default::default(),
    };
    pattern.extra.insert("nodes".to_string(), json!([]));

    vec![
        DragPayload::create_node(metadata),
        DragPayload::new(DragData::CreateNodeFromTemplate(TemplateRef {
            template_id: "t-1".to_string(),
            name: Some("Upscale".to_string()),
        })),
        DragPayload::asset(image_asset()).with_metadata(DragMetadata {
            source_id: Some("asset-grid".to_string()),
            thumbnail_url: Some("https://x/thumb.png".to_string()),
            ..Default::default()
        }),
        DragPayload::assets(vec!["a1".to_string(), "a2".to_string(), "a3".to_string()]),
        DragPayload::file(FileHandle::new("notes.txt", 12, "text/plain")),
        DragPayload::tab("workflow-42"),
        DragPayload::new(DragData::CollectionFile(CollectionFile {
            collection: "papers".to_string(),
            file: FileHandle::new("paper.pdf", 2048, "application/pdf"),
        })),
        DragPayload::new(DragData::Pattern(pattern)),
        DragPayload::new(DragData::OutputImage(OutputImage {
            url: "https://x/out.png".to_string(),
            content_type: Some("image/png".to_string()),
            node_id: Some("n-9".to_string()),
            extra: Default::default(),
        })),
        DragPayload::new(DragData::Other {
            kind: "sticky-note".to_string(),
            payload: json!({"text": "hello"}),
        }),
    ]
}

#[test]
fn test_unified_roundtrip_for_every_kind() {
    for payload in sample_payloads() {
        let mut transfer = MemoryTransfer::new();
        codec::serialize(&payload, &mut transfer);

        let decoded = codec::deserialize(&transfer);
        assert_eq!(decoded.as_ref(), Some(&payload), "kind {}", payload.kind());
    }
}

#[test]
fn test_legacy_only_roundtrip() {
    // Simulate an old producer: only the legacy key survives.
    for payload in sample_payloads() {
        let Some(key) = codec::legacy_key(&payload.kind()) else {
            continue;
        };
        let mut full = MemoryTransfer::new();
        codec::serialize(&payload, &mut full);

        let mut legacy_only = MemoryTransfer::new();
        let raw = full.get_data(key).expect("legacy key written");
        legacy_only.set_data(key, &raw);

        let decoded = codec::deserialize(&legacy_only).expect("legacy decode");
        assert_eq!(decoded.kind(), payload.kind());
        assert_eq!(decoded.data, payload.data);
        if payload.kind() == DragKind::AssetsMultiple {
            assert_eq!(decoded.metadata, payload.metadata);
        }
    }
}

#[test]
fn test_wire_shape() {
    let payload = DragPayload::asset(Asset::new("a1", "image/png"));
    let mut transfer = MemoryTransfer::new();
    codec::serialize(&payload, &mut transfer);

    let unified: serde_json::Value =
        serde_json::from_str(&transfer.get_data(DRAG_DATA_MIME).unwrap()).unwrap();
    assert_eq!(
        unified,
        json!({"kind": "asset", "payload": {"id": "a1", "content_type": "image/png"}})
    );

    // Legacy key carries the bare body, no tag.
    let bare: serde_json::Value =
        serde_json::from_str(&transfer.get_data(legacy::ASSET).unwrap()).unwrap();
    assert_eq!(bare, json!({"id": "a1", "content_type": "image/png"}));
}

#[test]
fn test_kinds_without_legacy_key_write_only_unified() {
    let mut transfer = MemoryTransfer::new();
    codec::serialize(&DragPayload::tab("wf-1"), &mut transfer);
    assert_eq!(transfer.types(), vec![DRAG_DATA_MIME.to_string()]);
}

#[test]
fn test_unified_key_wins_over_legacy() {
    let mut transfer = MemoryTransfer::new();
    transfer.set_data(legacy::ASSET, r#"{"id":"old","content_type":"image/jpeg"}"#);
    codec::serialize(&DragPayload::tab("wf-1"), &mut transfer);

    let decoded = codec::deserialize(&transfer).unwrap();
    assert_eq!(decoded, DragPayload::tab("wf-1"));
}

#[test]
fn test_malformed_unified_falls_through_to_legacy() {
    init_tracing();
    let mut transfer = MemoryTransfer::new();
    transfer.set_data(DRAG_DATA_MIME, "{not json");
    transfer.set_data(legacy::SELECTED_ASSET_IDS, r#"["a1","a2"]"#);

    let decoded = codec::deserialize(&transfer).unwrap();
    assert_eq!(decoded.data, DragData::AssetsMultiple(vec!["a1".into(), "a2".into()]));
    assert_eq!(decoded.metadata.and_then(|m| m.count), Some(2));
}

#[test]
fn test_unified_body_not_matching_kind_skips_legacy_keys() {
    init_tracing();
    // 1. Unified value is valid JSON, but the asset body is incomplete
    let mut transfer = MemoryTransfer::new();
    transfer.set_data(DRAG_DATA_MIME, r#"{"kind":"asset","payload":{"id":"new"}}"#);
    // 2. A stale legacy asset from another producer
    transfer.set_data(legacy::ASSET, r#"{"id":"old","content_type":"image/jpeg"}"#);

    // 3. The unified value decides: nothing is decoded
    assert_eq!(codec::deserialize(&transfer), None);
}

#[test]
fn test_unified_unknown_kind_keeps_body() {
    let mut transfer = MemoryTransfer::new();
    transfer.set_data(DRAG_DATA_MIME, r#"{"kind":"sticky-note","payload":{"text":"hi"}}"#);
    transfer.set_data(legacy::ASSET, r#"{"id":"old","content_type":"image/jpeg"}"#);

    let decoded = codec::deserialize(&transfer).unwrap();
    assert_eq!(decoded.kind(), DragKind::Other("sticky-note".to_string()));
    assert_eq!(
        decoded.data,
        DragData::Other {
            kind: "sticky-note".to_string(),
            payload: json!({"text": "hi"}),
        }
    );
}

#[test]
fn test_malformed_everything_yields_none() {
    init_tracing();
    let mut transfer = MemoryTransfer::new();
    transfer.set_data(DRAG_DATA_MIME, "garbage");
    transfer.set_data(legacy::CREATE_NODE, "[1,2");
    transfer.set_data(legacy::ASSET, r#"{"no_id": true}"#);
    assert_eq!(codec::deserialize(&transfer), None);
}

#[test]
fn test_external_files_are_not_decoded() {
    let transfer = MemoryTransfer::with_files(vec![FileHandle::new("a.png", 10, "image/png")]);
    assert!(codec::has_external_files(&transfer));
    assert_eq!(codec::deserialize(&transfer), None);
}

#[test]
fn test_has_external_files_without_item_kinds() {
    let empty = MemoryTransfer::new().without_item_kinds();
    assert!(!codec::has_external_files(&empty));

    let files = MemoryTransfer::with_files(vec![FileHandle::new("a.wav", 1, "audio/wav")])
        .without_item_kinds();
    assert!(codec::has_external_files(&files));
}

#[test]
fn test_extract_files_preserves_order() {
    let mut transfer = MemoryTransfer::new();
    transfer.add_file(FileHandle::new("1.png", 1, "image/png"));
    transfer.add_file(FileHandle::new("2.png", 2, "image/png"));

    let names: Vec<String> = codec::extract_files(&transfer)
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["1.png", "2.png"]);
}

#[test]
fn test_empty_transport() {
    assert_eq!(codec::deserialize(&MemoryTransfer::new()), None);
}

use flow_canvas::metadata::{IMAGE_NODE, MetadataRegistry, NodeMetadata};
use flow_canvas::view::Transform;
use flow_canvas::{Canvas, CanvasConfig};
use flow_dnd::draggable::{DragImage, DragImageDescriptor};
use flow_dnd::payload::{Asset, DragData, DragPayload, PropertyMetadata, TemplateRef};
use flow_dnd::{DragEvent, DragSession, Draggable, MemoryTransfer};
use glam::Vec2;
use serde_json::json;
use std::sync::Arc;

/// Plays one full gesture from `source` onto the canvas at `at`.
async fn gesture(canvas: &Canvas, session: &DragSession, source: &mut Draggable, at: Vec2) {
    let zone = canvas.drop_zone(session.clone());
    let mut transfer = MemoryTransfer::new();
    let event = DragEvent::at(at.x, at.y);

    source.drag_start(&event, &mut transfer);
    println!("  Dragging {} (session active: {})", source.payload().kind(), session.is_dragging());

    zone.drag_enter(&event);
    let _ = zone.drag_over(&event, &mut transfer);
    println!("  Hover phase: {:?}", zone.phase());

    let outcome = zone.drop(&event, &transfer).await;
    source.drag_end(&event);
    println!("  Drop outcome: {:?}", outcome);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    println!("=== FlowCanvas Headless Demo ===");

    // 1. Initialize Canvas with a small metadata registry
    let mut concat = NodeMetadata::new("nodetool.text.Concat");
    concat.title = "Concat".into();
    concat.properties.push(PropertyMetadata {
        name: "a".into(),
        default: json!(""),
    });
    let registry = MetadataRegistry::new()
        .with(concat.clone())
        .with(NodeMetadata::new(IMAGE_NODE));

    let canvas = Canvas::new(CanvasConfig::default(), Arc::new(registry));
    // Explicitly set a viewport size (simulating a window)
    canvas.update_viewport_size(Vec2::new(1280.0, 720.0));
    canvas.set_transform(Transform {
        pan: Vec2::new(-200.0, -100.0),
        zoom: 1.0,
    });

    let session = DragSession::new();

    // 2. Drop a node from the node menu
    println!("\n>> Node menu drag");
    let mut menu_item = Draggable::new(DragPayload::create_node(concat), session.clone());
    gesture(&canvas, &session, &mut menu_item, Vec2::new(300.0, 200.0)).await;

    // 3. Drop an image asset, with a synthesized preview
    println!("\n>> Asset drag");
    let mut asset = Asset::new("a1", "image/png");
    asset.get_url = Some("https://example.com/cat.png".into());
    let mut thumbnail = Draggable::new(DragPayload::asset(asset), session.clone()).drag_image(
        DragImage::Descriptor(DragImageDescriptor {
            thumbnail_url: Some("https://example.com/cat_thumb.png".into()),
            ..Default::default()
        }),
    );
    gesture(&canvas, &session, &mut thumbnail, Vec2::new(500.0, 200.0)).await;

    // 4. Save both nodes as a template and drop it back in
    println!("\n>> Template round trip");
    let template_id = {
        let mut graph = canvas.graph.lock().await;
        let uuids: Vec<_> = graph.nodes.values().map(|n| n.uuid).collect();
        for uuid in uuids {
            graph.select(uuid);
        }
        let mut templates = canvas
            .templates
            .lock()
            .map_err(|_| anyhow::anyhow!("template store poisoned"))?;
        templates.save_selection(&graph, "Concat + Image", "demo", "examples", vec![])?
    };
    let mut template_item = Draggable::new(
        DragPayload::new(DragData::CreateNodeFromTemplate(TemplateRef {
            template_id: template_id.clone(),
            name: None,
        })),
        session.clone(),
    );
    gesture(&canvas, &session, &mut template_item, Vec2::new(100.0, 400.0)).await;

    // 5. Report
    let graph = canvas.graph.lock().await;
    println!("\nGraph now has {} nodes and {} edges:", graph.nodes.len(), graph.edges.len());
    for id in &graph.draw_order {
        let node = &graph.nodes[*id];
        println!("  - {} at {}", node.node_type, node.position);
    }

    let snapshot = canvas
        .templates
        .lock()
        .map_err(|_| anyhow::anyhow!("template store poisoned"))?
        .save_to_string()?;
    println!("\nTemplate snapshot:\n{}", snapshot);

    println!("\nDemo Complete.");
    Ok(())
}

//! Integration tests for the public pipeline: persisted JSON in, validated
//! topology, positioned render model, SVG document out.

use callflow::{
    Direction, FlowDocument, GraphError, StepGraphBuilder,
    export::svg::Svg,
    layout::Engine,
};

const SUPPORT_FLOW: &str = r#"{
    "id": "5f0c6f9e-1f1b-4f4e-9b5a-1f9a1c2d3e4f",
    "name": "support-line",
    "created_at": "2024-03-01T09:00:00Z",
    "modified_at": "2024-03-02T10:30:00Z",
    "flow_data": [
        {
            "id": "step-1",
            "name": "Greeting",
            "description": "Open the call",
            "phrases": ["hello", "thank you for calling"],
            "parent": null
        },
        {
            "id": "step-2",
            "name": "Identify",
            "description": "Verify the caller",
            "phrases": ["may I have your name"],
            "parent": "step-1"
        },
        {
            "id": "step-3",
            "name": "Escalate",
            "description": "Hand over to a specialist",
            "phrases": ["let me transfer you"],
            "parent": "step-1"
        }
    ]
}"#;

#[test]
fn test_persisted_flow_round_trip() {
    let document: FlowDocument = serde_json::from_str(SUPPORT_FLOW).unwrap();
    assert_eq!(document.name(), Some("support-line"));

    let topology = StepGraphBuilder::new().build(document.steps()).unwrap();
    assert_eq!(topology.node_count(), 3);
    assert_eq!(topology.edge_count(), 2);

    let model = Engine::new().calculate(&topology).unwrap();

    let root = model.node_by_id("step-1").unwrap();
    let left = model.node_by_id("step-2").unwrap();
    let right = model.node_by_id("step-3").unwrap();

    assert_eq!(root.rank(), 0);
    assert_eq!(left.rank(), 1);
    assert_eq!(right.rank(), 1);

    assert_ne!(left.position().x(), right.position().x());
    assert_eq!(left.position().y(), right.position().y());
    assert!(left.position().y() > root.position().y());
}

#[test]
fn test_svg_document_carries_labels() {
    let document: FlowDocument = serde_json::from_str(SUPPORT_FLOW).unwrap();
    let topology = StepGraphBuilder::new().build(document.steps()).unwrap();
    let model = Engine::new().calculate(&topology).unwrap();

    let svg = Svg::new("unused.svg").render_document(&model).to_string();

    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("Greeting"));
    assert!(svg.contains("Verify the caller"));
    assert!(svg.contains("Phrases: let me transfer you"));
    // one arrowed path per edge
    assert_eq!(svg.matches("url(#arrowhead)").count(), 2);
}

#[test]
fn test_left_to_right_pipeline() {
    let document: FlowDocument = serde_json::from_str(SUPPORT_FLOW).unwrap();
    let topology = StepGraphBuilder::new().build(document.steps()).unwrap();
    let model = Engine::new()
        .with_direction(Direction::LeftToRight)
        .calculate(&topology)
        .unwrap();

    let root = model.node_by_id("step-1").unwrap();
    let child = model.node_by_id("step-2").unwrap();
    assert!(child.position().x() > root.position().x());
}

#[test]
fn test_bare_step_array_input() {
    let json = r#"[
        {"id": "a", "name": "A"},
        {"id": "b", "name": "B", "parent": "a"}
    ]"#;

    let document: FlowDocument = serde_json::from_str(json).unwrap();
    assert!(document.name().is_none());

    let topology = StepGraphBuilder::new().build(document.steps()).unwrap();
    assert_eq!(topology.node_count(), 2);
    assert_eq!(topology.edge_count(), 1);
}

#[test]
fn test_invalid_flow_surfaces_typed_error() {
    let json = r#"[{"id": "a", "name": "A", "parent": "missing"}]"#;

    let document: FlowDocument = serde_json::from_str(json).unwrap();
    let err = StepGraphBuilder::new().build(document.steps()).unwrap_err();

    assert_eq!(
        err,
        GraphError::DanglingParent {
            id: "a".to_string(),
            parent: "missing".to_string()
        }
    );
    // the message is suitable for direct user display
    assert_eq!(
        err.to_string(),
        "step `a` references unknown parent `missing`"
    );
}

#[test]
fn test_empty_flow_renders_empty_model() {
    let document: FlowDocument = serde_json::from_str("[]").unwrap();
    let topology = StepGraphBuilder::new().build(document.steps()).unwrap();
    let model = Engine::new().calculate(&topology).unwrap();

    assert!(model.is_empty());
    assert_eq!(model.bounds().width(), 0.0);
    assert_eq!(model.bounds().height(), 0.0);
}

use indexmap::IndexMap;

use runboard::canvas::CanvasState;
use runboard::error::{DashboardError, DocumentKind};
use runboard::fetch::Availability;
use runboard::geometry::Point;
use runboard::interaction::HitTarget;
use runboard::layout::parse_layout;
use runboard::model::{Layout, NodeType};
use runboard::router::{FlowState, RouteDirection, route_direction};
use runboard::scene::{DrawCall, StrokeVariant, build_scene};
use runboard::status::{LiveNodePatch, NodeStatus, NodeStatusEntry, RuntimeStatus};
use runboard::svg::scene_to_svg;

const TWO_NODES: &str = r#"{
  "meta": {"title": "Two nodes"},
  "views": [{
    "id": "main", "name": "Main",
    "canvas": {"width": 800, "height": 400},
    "groups": [{"x": 0, "y": 0, "width": 600, "height": 200, "label": "Stage"}],
    "nodes": [
      {"id": "A", "type": "pi", "label": "A", "x": 0, "y": 0},
      {"id": "B", "type": "tool", "label": "B", "x": 300, "y": 0}
    ],
    "connections": [
      {"id": "A-B", "from": "A", "to": "B"},
      {"id": "A-ghost", "from": "A", "to": "ghost"}
    ]
  }]
}"#;

fn state() -> CanvasState {
    CanvasState::new(parse_layout(TWO_NODES).unwrap()).unwrap()
}

fn runtime(a: &str, b: &str) -> RuntimeStatus {
    serde_json::from_str(&format!(
        r#"{{"nodes": {{"A": {{"status": "{a}"}}, "B": {{"status": "{b}"}}}}}}"#
    ))
    .unwrap()
}

#[test]
fn test_two_node_scenario() {
    let s = state();
    let view = s.view();
    assert_eq!(
        route_direction(view.node("A").unwrap(), view.node("B").unwrap()),
        RouteDirection::LeftToRight
    );
    // the dangling connection is dropped without error
    assert_eq!(s.routes().len(), 1);
    assert_eq!(s.routes()[0].id, "A-B");

    let scene = build_scene(&s);
    assert_eq!(scene.node_cards().count(), 2);
    assert_eq!(scene.connection_ids(), ["A-B"]);
    // groups first, then echo below primary, then cards
    assert!(matches!(scene.calls[0], DrawCall::Group { .. }));
    assert!(matches!(
        scene.calls[1],
        DrawCall::Connection {
            stroke: StrokeVariant::Echo,
            ..
        }
    ));
    assert!(matches!(
        scene.calls[2],
        DrawCall::Connection {
            stroke: StrokeVariant::Primary,
            ..
        }
    ));
    assert!(matches!(scene.calls[3], DrawCall::Node(_)));
}

#[test]
fn test_type_filter_hides_node_and_connection() {
    let mut s = state();
    s.set_active_types([NodeType::Tool]);
    assert!(!s.is_node_visible("A"));
    assert!(s.is_node_visible("B"));
    assert!(!s.routes()[0].visible);
    assert_eq!(s.visible_routes().count(), 0);

    let scene = build_scene(&s);
    let ids: Vec<&str> = scene.node_cards().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["B"]);
    assert!(scene.connection_ids().is_empty());

    // hidden nodes are not hit
    assert_eq!(s.hit_test(Point::new(10.0, 10.0)), HitTarget::Canvas);
    assert_eq!(s.hit_test(Point::new(310.0, 10.0)), HitTarget::Node("B".into()));

    assert!(s.toggle_type(NodeType::Pi));
    assert_eq!(s.visible_routes().count(), 1);
    assert!(!s.toggle_type(NodeType::Pi));
}

#[test]
fn test_status_drives_cards_and_flow() {
    let mut s = state();
    assert_eq!(s.routes()[0].flow, FlowState::Idle);

    s.set_runtime(Some(runtime("done", "idle")));
    assert_eq!(s.routes()[0].flow, FlowState::Running);
    assert_eq!(s.runtime_availability(), &Availability::Ready);

    let mut patch: LiveNodePatch = IndexMap::new();
    patch.insert("B".into(), NodeStatusEntry::with_message(NodeStatus::Fail, "boom"));
    s.set_live_patch(Some(patch));
    assert_eq!(s.routes()[0].flow, FlowState::Fail);

    let scene = build_scene(&s);
    let b = scene.node("B").unwrap();
    assert_eq!(b.status, NodeStatus::Fail);
    assert_eq!(b.tooltip, "Failed: boom");
    assert_eq!(b.status_style.attribute, "fail");
    assert_eq!(b.icon.as_deref(), Some("⚙"));

    s.set_live_patch(None);
    assert_eq!(s.routes()[0].flow, FlowState::Running);
}

#[test]
fn test_stale_runtime_response_is_discarded() {
    let mut s = state();
    let slow = s.begin_runtime_fetch();
    assert_eq!(s.runtime_availability(), &Availability::Loading);
    let fast = s.begin_runtime_fetch();

    assert!(s.complete_runtime_fetch(fast, Ok(runtime("done", "done"))));
    assert_eq!(s.routes()[0].flow, FlowState::Done);

    assert!(!s.complete_runtime_fetch(slow, Ok(runtime("fail", "fail"))));
    assert_eq!(s.routes()[0].flow, FlowState::Done);
    assert_eq!(s.effective_status().status("A"), NodeStatus::Done);
}

#[test]
fn test_stale_live_patch_is_discarded() {
    let mut s = state();
    let old = s.begin_live_fetch();
    let new = s.begin_live_fetch();
    let mut running: LiveNodePatch = IndexMap::new();
    running.insert("A".into(), NodeStatusEntry::new(NodeStatus::Running));
    assert!(s.complete_live_fetch(new, Some(running)));
    assert!(!s.complete_live_fetch(old, None));
    assert_eq!(s.effective_status().status("A"), NodeStatus::Running);
}

#[test]
fn test_failed_runtime_fetch_degrades() {
    let mut s = state();
    s.set_runtime(Some(runtime("done", "done")));
    let t = s.begin_runtime_fetch();
    let err = DashboardError::Load {
        document: DocumentKind::RuntimeStatus,
        location: "state.json".into(),
        reason: "connection refused".into(),
    };
    assert!(s.complete_runtime_fetch(t, Err(err)));
    assert!(matches!(s.runtime_availability(), Availability::Unavailable(_)));
    assert!(s.runtime().is_none());
    // graph still renders, all idle
    assert_eq!(s.routes()[0].flow, FlowState::Idle);
    assert_eq!(build_scene(&s).node_cards().count(), 2);
}

#[test]
fn test_canvas_rejects_layout_without_views() {
    // deserialized directly, so no validation has run yet
    let empty: Layout = serde_json::from_str(r#"{"views": []}"#).unwrap();
    let err = CanvasState::new(empty).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Schema {
            document: DocumentKind::Layout,
            ..
        }
    ));
}

#[test]
fn test_unknown_view_is_a_resolution_error() {
    let mut s = state();
    let err = s.select_view("nope").unwrap_err();
    assert!(matches!(err, DashboardError::Resolution { .. }));
    assert_eq!(s.view().id, "main");
}

#[test]
fn test_svg_output() {
    let mut s = state();
    s.set_runtime(Some(runtime("running", "idle")));
    let svg = scene_to_svg(&build_scene(&s));
    assert!(svg.starts_with("<svg "));
    assert!(svg.contains(r#"data-id="A-B""#));
    assert!(svg.contains(r#"data-flow="running""#));
    assert!(svg.contains(r#"class="connection echo""#));
    assert!(svg.contains(r#"class="connection primary""#));
    assert!(svg.contains(r#"data-status="running""#));
    assert!(svg.contains("Two nodes | Main"));
    assert!(!svg.contains("ghost"));
}

use indexmap::IndexMap;

use runboard::overlay::{
    ChecklistSummary, REQUIRED_CHECKLIST_TITLES, effective_status, flow_style, status_style,
    status_tooltip, visible_checklist,
};
use runboard::router::FlowState;
use runboard::status::{LiveNodePatch, NodeStatus, NodeStatusEntry, RuntimeStatus};

fn runtime() -> RuntimeStatus {
    serde_json::from_str(
        r#"{
            "meta": {"run_id": "run-7"},
            "nodes": {
                "prep": {"status": "done"},
                "train": {"status": "running", "message": "epoch 3"},
                "score": {"status": "idle"}
            },
            "checklist": [
                {"index": 1, "title": "Check trained checkpoints", "passed": true},
                {"index": 2, "title": "X", "passed": true},
                {"index": 3, "title": "Check backup bundle", "passed": false, "hint": "run backup"}
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_no_inputs_everything_idle() {
    let m = effective_status(None, None);
    assert!(m.is_empty());
    assert_eq!(m.status("anything"), NodeStatus::Idle);
    assert_eq!(m.get("anything").message, None);
}

#[test]
fn test_runtime_only() {
    let rt = runtime();
    let m = effective_status(Some(&rt), None);
    assert_eq!(m.len(), 3);
    assert_eq!(m.status("prep"), NodeStatus::Done);
    assert_eq!(m.get("train").message.as_deref(), Some("epoch 3"));
    assert_eq!(m.status("missing"), NodeStatus::Idle);
}

#[test]
fn test_live_patch_wins_and_adds() {
    let rt = runtime();
    let mut patch: LiveNodePatch = IndexMap::new();
    patch.insert(
        "train".into(),
        NodeStatusEntry::with_message(NodeStatus::Fail, "OOM"),
    );
    patch.insert("export".into(), NodeStatusEntry::new(NodeStatus::Running));

    let m = effective_status(Some(&rt), Some(&patch));
    assert_eq!(m.status("train"), NodeStatus::Fail);
    assert_eq!(m.get("train").message.as_deref(), Some("OOM"));
    assert_eq!(m.status("export"), NodeStatus::Running);
    // untouched entries survive
    assert_eq!(m.status("prep"), NodeStatus::Done);
    assert_eq!(m.len(), 4);

    // a patch alone still applies
    let only = effective_status(None, Some(&patch));
    assert_eq!(only.status("export"), NodeStatus::Running);
    assert_eq!(only.status("prep"), NodeStatus::Idle);
}

#[test]
fn test_merge_is_idempotent() {
    let rt = runtime();
    let mut patch: LiveNodePatch = IndexMap::new();
    patch.insert("score".into(), NodeStatusEntry::new(NodeStatus::Done));
    let a = effective_status(Some(&rt), Some(&patch));
    let b = effective_status(Some(&rt), Some(&patch));
    assert_eq!(a, b);
}

#[test]
fn test_status_styles() {
    assert_eq!(status_style(NodeStatus::Running).attribute, "running");
    assert_eq!(status_style(NodeStatus::Fail).label, "Failed");
    assert_eq!(flow_style(FlowState::Running).label, "Flowing");
    assert_eq!(
        flow_style(FlowState::Done).color,
        status_style(NodeStatus::Done).color
    );
    assert_eq!(
        status_tooltip(&NodeStatusEntry::with_message(NodeStatus::Running, "epoch 3")),
        "Running: epoch 3"
    );
    assert_eq!(status_tooltip(&NodeStatusEntry::new(NodeStatus::Idle)), "Idle");
}

#[test]
fn test_checklist_allow_list() {
    let rt = runtime();
    let visible = visible_checklist(&rt.checklist);
    let titles: Vec<&str> = visible.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["Check trained checkpoints", "Check backup bundle"]);
    assert!(!titles.contains(&"X"));

    let summary = ChecklistSummary::of(&rt.checklist);
    assert_eq!(summary, ChecklistSummary { passed: 1, total: 2 });
    assert!(!summary.all_passed());
    assert_eq!(REQUIRED_CHECKLIST_TITLES.len(), 7);
}

#[test]
fn test_status_map_for_view_covers_every_node() {
    let layout = runboard::layout::parse_layout(
        r#"{"views": [{"id": "v", "name": "V", "canvas": {"width": 800, "height": 400},
            "nodes": [
              {"id": "prep", "type": "function", "label": "Prep", "x": 0, "y": 0},
              {"id": "new", "type": "tool", "label": "New", "x": 300, "y": 0}
            ]}]}"#,
    )
    .unwrap();
    let rt = runtime();
    let m = effective_status(Some(&rt), None);
    let rows = m.for_view(&layout.views[0]);
    let ids: Vec<&str> = rows.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["prep", "new"]);
    assert_eq!(rows[0].1.status, NodeStatus::Done);
    assert_eq!(rows[1].1.status, NodeStatus::Idle);
}

//! Merging runtime snapshots with live job patches, and mapping the result
//! onto rendering attributes.

use indexmap::IndexMap;

use crate::model::View;
use crate::node_types::Rgb;
use crate::router::FlowState;
use crate::status::{ChecklistItem, LiveNodePatch, NodeStatus, NodeStatusEntry, RuntimeStatus};

/// Effective per-node status. Lookups of unknown ids yield `idle`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusMap {
    entries: IndexMap<String, NodeStatusEntry>,
}

static IDLE_ENTRY: NodeStatusEntry = NodeStatusEntry {
    status: NodeStatus::Idle,
    message: None,
    updated_at: None,
};

impl StatusMap {
    pub fn get(&self, id: &str) -> &NodeStatusEntry {
        self.entries.get(id).unwrap_or(&IDLE_ENTRY)
    }

    pub fn status(&self, id: &str) -> NodeStatus {
        self.get(id).status
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeStatusEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// One entry per node of `view`, in node order, defaulting to idle.
    pub fn for_view(&self, view: &View) -> Vec<(String, NodeStatusEntry)> {
        view.nodes
            .iter()
            .map(|n| (n.id.clone(), self.get(&n.id).clone()))
            .collect()
    }
}

/// Combine a runtime snapshot and an optional live patch.
///
/// Starts from the snapshot's node map (empty when there is no snapshot) and
/// overlays every live-patch entry; the patch wins per node id.
pub fn effective_status(
    runtime: Option<&RuntimeStatus>,
    live_patch: Option<&LiveNodePatch>,
) -> StatusMap {
    let mut entries = runtime.map(|r| r.nodes.clone()).unwrap_or_default();
    if let Some(patch) = live_patch {
        for (id, entry) in patch {
            entries.insert(id.clone(), entry.clone());
        }
    }
    StatusMap { entries }
}

// ────────────────────────────────────────────────────────────────────────────
// Render attributes
// ────────────────────────────────────────────────────────────────────────────

/// Visual attributes derived from a status or flow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    /// Value for a `data-status` style attribute / CSS class suffix.
    pub attribute: &'static str,
    pub label: &'static str,
    pub color: Rgb,
}

pub fn status_style(status: NodeStatus) -> StatusStyle {
    match status {
        NodeStatus::Idle => StatusStyle {
            attribute: "idle",
            label: "Idle",
            color: Rgb(148, 163, 184),
        },
        NodeStatus::Running => StatusStyle {
            attribute: "running",
            label: "Running",
            color: Rgb(59, 130, 246),
        },
        NodeStatus::Done => StatusStyle {
            attribute: "done",
            label: "Done",
            color: Rgb(34, 197, 94),
        },
        NodeStatus::Fail => StatusStyle {
            attribute: "fail",
            label: "Failed",
            color: Rgb(239, 68, 68),
        },
    }
}

pub fn flow_style(flow: FlowState) -> StatusStyle {
    let node_status = match flow {
        FlowState::Idle => NodeStatus::Idle,
        FlowState::Running => NodeStatus::Running,
        FlowState::Done => NodeStatus::Done,
        FlowState::Fail => NodeStatus::Fail,
    };
    StatusStyle {
        label: match flow {
            FlowState::Running => "Flowing",
            _ => status_style(node_status).label,
        },
        ..status_style(node_status)
    }
}

/// Tooltip text for a node: status label plus message when present.
pub fn status_tooltip(entry: &NodeStatusEntry) -> String {
    let style = status_style(entry.status);
    match entry.message.as_deref().filter(|m| !m.is_empty()) {
        Some(msg) => format!("{}: {}", style.label, msg),
        None => style.label.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Checklist
// ────────────────────────────────────────────────────────────────────────────

/// Titles of the checks the release gate requires, in display order.
pub const REQUIRED_CHECKLIST_TITLES: [&str; 7] = [
    "Check trained checkpoints",
    "Check PatchTST scaler artifact",
    "Check TensorBoard logs",
    "Check final training configs",
    "Check backup bundle",
    "Run scoring smoke test for both streams",
    "Check split policy documentation",
];

pub fn is_required_check(title: &str) -> bool {
    REQUIRED_CHECKLIST_TITLES.contains(&title.trim())
}

/// Checklist items to display: only titles on the required list.
pub fn visible_checklist(items: &[ChecklistItem]) -> Vec<&ChecklistItem> {
    items.iter().filter(|i| is_required_check(&i.title)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ChecklistSummary {
    pub passed: usize,
    pub total: usize,
}

impl ChecklistSummary {
    /// Count over the visible (required) items only.
    pub fn of(items: &[ChecklistItem]) -> Self {
        let visible = visible_checklist(items);
        Self {
            passed: visible.iter().filter(|i| i.passed).count(),
            total: visible.len(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

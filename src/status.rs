//! Runtime status documents produced by the training pipeline.
//!
//! All of these are read-only inputs. Parsing is lenient so that a partially
//! written or older snapshot still renders: absent sections default to empty
//! and values of the wrong type read as absent.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Execution status of a single pipeline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NodeStatus {
    #[default]
    Idle,
    Running,
    Done,
    Fail,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Running => "running",
            NodeStatus::Done => "done",
            NodeStatus::Fail => "fail",
        }
    }
}

impl From<String> for NodeStatus {
    /// Unknown status strings are treated as `idle`.
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => NodeStatus::Running,
            "done" => NodeStatus::Done,
            "fail" => NodeStatus::Fail,
            _ => NodeStatus::Idle,
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeStatusEntry {
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl NodeStatusEntry {
    pub fn new(status: NodeStatus) -> Self {
        Self {
            status,
            message: None,
            updated_at: None,
        }
    }

    pub fn with_message(status: NodeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            updated_at: None,
        }
    }
}

/// Per-node overrides from an in-progress job. Wins over the runtime snapshot.
pub type LiveNodePatch = IndexMap<String, NodeStatusEntry>;

// ────────────────────────────────────────────────────────────────────────────
// Runtime status document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeStatus {
    #[serde(default)]
    pub meta: RunMeta,
    #[serde(default)]
    pub nodes: IndexMap<String, NodeStatusEntry>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub metrics: BTreeMap<String, StreamMetrics>,
    #[serde(default)]
    pub artifacts: Artifacts,
}

impl RuntimeStatus {
    pub fn run_id(&self) -> Option<&str> {
        self.meta.run_id.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Loss series of a training stream, empty when the stream is absent.
    pub fn loss_series(&self, stream: &str) -> &[LossPoint] {
        self.metrics
            .get(stream)
            .map(|m| m.loss.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMeta {
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Any other metadata the exporter adds (repo root, layout path, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(default)]
    pub index: u32,
    pub title: String,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamMetrics {
    #[serde(default)]
    pub loss: Vec<LossPoint>,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// One epoch of a loss curve. Non-numeric values read as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LossPoint {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub epoch: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub train_loss: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub val_loss: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artifacts {
    /// Readiness flags such as `checkpoints_ready`, `scaler_ready`.
    #[serde(default, deserialize_with = "lenient_flags")]
    pub readiness: IndexMap<String, bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Artifacts {
    /// Readiness flags that are set, in document order.
    pub fn ready_flags(&self) -> impl Iterator<Item = &str> {
        self.readiness
            .iter()
            .filter(|(_, ready)| **ready)
            .map(|(k, _)| k.as_str())
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(v.as_f64())
}

fn lenient_flags<'de, D: Deserializer<'de>>(d: D) -> Result<IndexMap<String, bool>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    let Some(map) = v.as_object() else {
        return Ok(IndexMap::new());
    };
    Ok(map
        .iter()
        .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
        .collect())
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(v.as_i64())
}

// ────────────────────────────────────────────────────────────────────────────
// Job status document
// ────────────────────────────────────────────────────────────────────────────

/// Lifecycle of the training job controlled by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Stopping,
    Success,
    Failed,
}

impl JobState {
    /// The job has finished; nothing further will change until a new start.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Success | JobState::Failed)
    }

    pub fn is_active(self) -> bool {
        matches!(self, JobState::Running | JobState::Stopping)
    }
}

impl From<String> for JobState {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => JobState::Running,
            "stopping" => JobState::Stopping,
            "success" => JobState::Success,
            "failed" => JobState::Failed,
            _ => JobState::Idle,
        }
    }
}

/// The `job` section of the backend's status endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSnapshot {
    #[serde(default)]
    pub state: JobState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub active_step: Option<String>,
    #[serde(default)]
    pub step_index: Option<u32>,
    #[serde(default)]
    pub step_total: Option<u32>,
    #[serde(default)]
    pub live_nodes: LiveNodePatch,
    #[serde(default)]
    pub log_tail: Vec<String>,
}

impl JobSnapshot {
    /// The live patch to overlay, if any. An idle job has never run in this
    /// backend session, so its node map carries no information.
    pub fn live_patch(&self) -> Option<&LiveNodePatch> {
        if self.state == JobState::Idle || self.live_nodes.is_empty() {
            None
        } else {
            Some(&self.live_nodes)
        }
    }

    /// "Step 2/6: train_patchtst" style progress text.
    pub fn progress_label(&self) -> Option<String> {
        let step = self.active_step.as_deref()?;
        match (self.step_index, self.step_total) {
            (Some(i), Some(n)) => Some(format!("Step {i}/{n}: {step}")),
            _ => Some(step.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatusDocument {
    #[serde(default)]
    pub job: JobSnapshot,
}

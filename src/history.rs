//! Run history: the index of persisted run snapshots, a session-long memo of
//! loaded snapshots, and resolution of "current"/"baseline" selections.

use std::collections::{BTreeMap, HashMap};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{DashboardError, DocumentKind};
use crate::overlay::ChecklistSummary;
use crate::source::{ContentSource, read_json};
use crate::status::RuntimeStatus;

/// Selection key that means "the live runtime snapshot".
pub const CURRENT_RUN_KEY: &str = "current";

/// File name of the index inside a run-history directory or bundle.
pub const RUN_INDEX_FILE: &str = "index.json";

// ────────────────────────────────────────────────────────────────────────────
// Index
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RunIndexEntry {
    pub run_id: String,
    /// Snapshot file name relative to the history root; also the memo key.
    pub file: String,
    pub timestamp: Option<String>,
    /// Pass counts recorded by the exporter, if present.
    pub checklist: Option<ChecklistSummary>,
    /// Final validation loss per stream recorded by the exporter.
    pub final_val_loss: BTreeMap<String, Option<f64>>,
}

impl RunIndexEntry {
    fn from_value(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        let run_id = obj.get("run_id")?.as_str()?.to_string();
        let file = obj.get("file")?.as_str()?.to_string();
        if !is_relative_inside_root(&file) {
            warn!(run_id = %run_id, file = %file, "run index entry points outside the history root; dropped");
            return None;
        }
        let timestamp = obj
            .get("timestamp")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let checklist = obj.get("checklist").and_then(|c| {
            Some(ChecklistSummary {
                passed: c.get("passed")?.as_u64()? as usize,
                total: c.get("total")?.as_u64()? as usize,
            })
        });
        let final_val_loss = obj
            .get("final_val_loss")
            .and_then(Value::as_object)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.as_f64())).collect())
            .unwrap_or_default();
        Some(Self {
            run_id,
            file,
            timestamp,
            checklist,
            final_val_loss,
        })
    }

    /// Label for selectors: `run-id (timestamp)`.
    pub fn display_label(&self) -> String {
        match &self.timestamp {
            Some(ts) => format!("{} ({})", self.run_id, ts),
            None => self.run_id.clone(),
        }
    }
}

/// A snapshot file must be a plain relative path below the history root.
fn is_relative_inside_root(file: &str) -> bool {
    let path = Utf8Path::new(file);
    !file.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunIndex {
    pub generated_at: Option<String>,
    /// Newest first, as written by the exporter.
    pub runs: Vec<RunIndexEntry>,
}

impl RunIndex {
    /// Build from a parsed document, dropping entries without string
    /// `run_id` and `file`.
    pub fn from_value(v: &Value) -> Self {
        let runs: Vec<RunIndexEntry> = v
            .get("runs")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(RunIndexEntry::from_value).collect())
            .unwrap_or_default();
        let total = v
            .get("runs")
            .and_then(Value::as_array)
            .map_or(0, |a| a.len());
        if runs.len() < total {
            debug!(dropped = total - runs.len(), "malformed run index entries dropped");
        }
        Self {
            generated_at: v
                .get("generated_at")
                .and_then(Value::as_str)
                .map(str::to_string),
            runs,
        }
    }

    pub fn parse(json: &str) -> Result<Self, DashboardError> {
        let v: Value = serde_json::from_str(json)
            .map_err(|e| DashboardError::from_json(DocumentKind::RunIndex, "<memory>", e))?;
        Self::from_document(&v, "<memory>")
    }

    fn from_document(v: &Value, location: &str) -> Result<Self, DashboardError> {
        if !v.is_object() {
            return Err(DashboardError::Schema {
                document: DocumentKind::RunIndex,
                location: location.to_string(),
                reason: "run index must be a JSON object".to_string(),
            });
        }
        Ok(Self::from_value(v))
    }

    pub fn find(&self, run_id: &str) -> Option<&RunIndexEntry> {
        self.runs.iter().find(|r| r.run_id == run_id)
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Baseline to preselect: the first run that is not the live run.
///
/// Without a live run id nothing can be excluded, so the first run is used.
pub fn preferred_baseline<'a>(
    index: &'a RunIndex,
    current_run_id: Option<&str>,
) -> Option<&'a RunIndexEntry> {
    match current_run_id {
        Some(id) => index.runs.iter().find(|r| r.run_id != id),
        None => index.runs.first(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunSelection {
    Current,
    Run(String),
}

impl RunSelection {
    pub fn from_key(key: &str) -> Self {
        let key = key.trim();
        if key.is_empty() || key == CURRENT_RUN_KEY {
            RunSelection::Current
        } else {
            RunSelection::Run(key.to_string())
        }
    }

    pub fn key(&self) -> &str {
        match self {
            RunSelection::Current => CURRENT_RUN_KEY,
            RunSelection::Run(id) => id,
        }
    }
}

/// The pair of snapshots the comparison panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonSelection {
    pub current: RunSelection,
    /// `None` when the index offers no baseline.
    pub baseline: Option<RunSelection>,
}

impl ComparisonSelection {
    /// Live snapshot against the preferred baseline.
    pub fn default_for(index: &RunIndex, current_run_id: Option<&str>) -> Self {
        Self {
            current: RunSelection::Current,
            baseline: preferred_baseline(index, current_run_id)
                .map(|e| RunSelection::Run(e.run_id.clone())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// History with snapshot memo
// ────────────────────────────────────────────────────────────────────────────

/// Run index plus an append-only memo of snapshots keyed by file name.
///
/// Single-threaded by construction (`&mut self` for loads). A host that loads
/// snapshots in parallel must wrap this in its own lock.
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    root: Utf8PathBuf,
    index: RunIndex,
    snapshots: HashMap<String, RuntimeStatus>,
    loads: usize,
}

impl RunHistory {
    pub fn new(root: impl Into<Utf8PathBuf>, index: RunIndex) -> Self {
        Self {
            root: root.into(),
            index,
            snapshots: HashMap::new(),
            loads: 0,
        }
    }

    /// Read `<root>/index.json` from `source`.
    pub fn load<S: ContentSource + ?Sized>(
        source: &mut S,
        root: &Utf8Path,
    ) -> Result<Self, DashboardError> {
        let path = root.join(RUN_INDEX_FILE);
        let v: Value = read_json(source, &path, DocumentKind::RunIndex)?;
        let index = RunIndex::from_document(&v, path.as_str())?;
        info!(path = %path, runs = index.runs.len(), "run index loaded");
        Ok(Self::new(root, index))
    }

    pub fn index(&self) -> &RunIndex {
        &self.index
    }

    /// Swap in a freshly loaded index. Memoized snapshots are kept: snapshot
    /// files are immutable once written.
    pub fn replace_index(&mut self, index: RunIndex) {
        self.index = index;
    }

    pub fn is_cached(&self, file: &str) -> bool {
        self.snapshots.contains_key(file)
    }

    /// Number of snapshot documents actually read from the source.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    /// Load (once) and return the snapshot stored in `file`.
    pub fn snapshot<S: ContentSource + ?Sized>(
        &mut self,
        file: &str,
        source: &mut S,
    ) -> Option<&RuntimeStatus> {
        if !self.snapshots.contains_key(file) {
            if !is_relative_inside_root(file) {
                warn!(file, "snapshot path outside the history root refused");
                return None;
            }
            let path = self.root.join(file);
            self.loads += 1;
            match read_json::<RuntimeStatus, S>(source, &path, DocumentKind::RunSnapshot) {
                Ok(snapshot) => {
                    debug!(file, "run snapshot loaded");
                    self.snapshots.insert(file.to_string(), snapshot);
                }
                Err(e) => {
                    warn!(file, error = %e, "run snapshot unavailable");
                    return None;
                }
            }
        } else {
            debug!(file, "run snapshot served from memo");
        }
        self.snapshots.get(file)
    }

    /// Resolve a selection to a snapshot. `Current` yields `current` as is;
    /// unknown runs and failed loads yield `None`.
    pub fn resolve<'a, S: ContentSource + ?Sized>(
        &'a mut self,
        selection: &RunSelection,
        current: Option<&'a RuntimeStatus>,
        source: &mut S,
    ) -> Option<&'a RuntimeStatus> {
        match selection {
            RunSelection::Current => current,
            RunSelection::Run(run_id) => {
                let Some(file) = self.index.find(run_id).map(|e| e.file.clone()) else {
                    debug!(run_id = %run_id, "selected run is not in the index");
                    return None;
                };
                self.snapshot(&file, source)
            }
        }
    }

    /// Resolve a selection and clone the result, for callers that need two
    /// resolved snapshots at once.
    pub fn resolve_owned<S: ContentSource + ?Sized>(
        &mut self,
        selection: &RunSelection,
        current: Option<&RuntimeStatus>,
        source: &mut S,
    ) -> Option<RuntimeStatus> {
        match selection {
            RunSelection::Current => current.cloned(),
            RunSelection::Run(_) => self.resolve(selection, None, source).cloned(),
        }
    }
}

//! Dashboard configuration: where the documents live and how often to poll.

use std::time::Duration;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::source::ContentSource;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub layout_path: Utf8PathBuf,
    pub status_path: Utf8PathBuf,
    /// Directory holding `index.json` and one snapshot per run.
    pub runs_dir: Utf8PathBuf,
    /// Zip archive of a run-history directory; read instead of `runs_dir`.
    pub runs_bundle: Option<Utf8PathBuf>,
    pub job_status_path: Option<Utf8PathBuf>,
    pub poll_interval_ms: u64,
    /// View shown first; the layout's first view when unset.
    pub default_view: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            layout_path: Utf8PathBuf::from("training_dashboard/data/dashboard-layout.json"),
            status_path: Utf8PathBuf::from("training_dashboard/data/dashboard-state.json"),
            runs_dir: Utf8PathBuf::from("training_dashboard/data/runs"),
            runs_bundle: None,
            job_status_path: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            default_view: None,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file through `source`.
    pub fn load<S: ContentSource + ?Sized>(source: &mut S, path: &Utf8Path) -> Result<Self> {
        let text = source
            .read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path))
    }

    pub fn parse(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

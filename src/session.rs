//! One dashboard session: a content source wired to the canvas, the run
//! history and the job poll.
//!
//! The session is synchronous. Each refresh issues a ticket, reads the
//! document and completes the ticket, so the same ordering rules apply as
//! for a host that fetches asynchronously through [`CanvasState`] directly.

use std::time::Instant;

use anyhow::Context;
use camino::Utf8PathBuf;
use tracing::{debug, info, warn};

use crate::canvas::CanvasState;
use crate::compare::{DeltaSummary, compare};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, DocumentKind};
use crate::fetch::Availability;
use crate::history::{ComparisonSelection, RunHistory, RunIndex, RunSelection};
use crate::layout::load_layout;
use crate::poll::PollTask;
use crate::source::{ContentSource, ZipSource, read_json};
use crate::status::{JobSnapshot, JobStatusDocument, RuntimeStatus};

pub struct DashboardSession<S: ContentSource> {
    config: DashboardConfig,
    source: S,
    /// Separate source for run history (a zip bundle); `source` otherwise.
    history_source: Option<Box<dyn ContentSource>>,
    history_root: Utf8PathBuf,
    canvas: CanvasState,
    history: Option<RunHistory>,
    history_availability: Availability,
    job: Option<JobSnapshot>,
    job_availability: Availability,
    poll: PollTask,
    comparison: ComparisonSelection,
}

impl<S: ContentSource> DashboardSession<S> {
    /// Load the layout and every optional document.
    ///
    /// Only a layout failure is returned; the other documents degrade to
    /// [`Availability::Unavailable`].
    pub fn open(config: DashboardConfig, mut source: S) -> Result<Self, DashboardError> {
        let layout = load_layout(&mut source, &config.layout_path)?;
        let mut canvas = CanvasState::new(layout)?;
        if let Some(view) = config.default_view.as_deref() {
            if let Err(e) = canvas.select_view(view) {
                warn!(error = %e, "default view not found; showing the first view");
            }
        }

        let (history_source, history_root) = match &config.runs_bundle {
            Some(bundle) => match ZipSource::open(bundle) {
                Ok(zip) => (
                    Some(Box::new(zip) as Box<dyn ContentSource>),
                    Utf8PathBuf::new(),
                ),
                Err(e) => {
                    let reason = format!("{e:#}");
                    warn!(bundle = %bundle, error = %reason, "run bundle unavailable");
                    (None, config.runs_dir.clone())
                }
            },
            None => (None, config.runs_dir.clone()),
        };

        let poll = PollTask::new(config.poll_interval());
        let mut session = Self {
            config,
            source,
            history_source,
            history_root,
            canvas,
            history: None,
            history_availability: Availability::NotRequested,
            job: None,
            job_availability: Availability::NotRequested,
            poll,
            comparison: ComparisonSelection {
                current: RunSelection::Current,
                baseline: None,
            },
        };
        session.refresh_runtime();
        session.refresh_history();
        session.refresh_job(Instant::now());
        session.comparison = ComparisonSelection::default_for(
            session.history_index_or_empty(),
            session.canvas.runtime().and_then(RuntimeStatus::run_id),
        );
        Ok(session)
    }

    /// Replace the history source, e.g. with an in-memory bundle, and reload
    /// the index from `root` inside it.
    pub fn with_history_source(
        mut self,
        source: Box<dyn ContentSource>,
        root: impl Into<Utf8PathBuf>,
    ) -> Self {
        self.history_source = Some(source);
        self.history_root = root.into();
        self.history = None;
        self.refresh_history();
        self.comparison = ComparisonSelection::default_for(
            self.history_index_or_empty(),
            self.canvas.runtime().and_then(RuntimeStatus::run_id),
        );
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut CanvasState {
        &mut self.canvas
    }

    /// Switch the canvas to view `id`. An unknown id is logged and the
    /// current view stays; returns whether the switch happened.
    pub fn select_view(&mut self, id: &str) -> bool {
        match self.canvas.select_view(id) {
            Ok(_released) => true,
            Err(e) => {
                warn!(error = %e, "view switch ignored");
                false
            }
        }
    }

    pub fn history(&self) -> Option<&RunHistory> {
        self.history.as_ref()
    }

    pub fn history_availability(&self) -> &Availability {
        &self.history_availability
    }

    pub fn job(&self) -> Option<&JobSnapshot> {
        self.job.as_ref()
    }

    pub fn job_availability(&self) -> &Availability {
        &self.job_availability
    }

    pub fn poll(&self) -> &PollTask {
        &self.poll
    }

    fn history_index_or_empty(&self) -> &RunIndex {
        static EMPTY: RunIndex = RunIndex {
            generated_at: None,
            runs: Vec::new(),
        };
        self.history.as_ref().map_or(&EMPTY, |h| h.index())
    }

    // ── refresh ─────────────────────────────────────────────────────────────

    /// Re-read the runtime status document.
    pub fn refresh_runtime(&mut self) {
        let ticket = self.canvas.begin_runtime_fetch();
        let result = read_json::<RuntimeStatus, S>(
            &mut self.source,
            &self.config.status_path,
            DocumentKind::RuntimeStatus,
        );
        if let Ok(status) = &result {
            info!(
                run_id = status.run_id().unwrap_or("-"),
                nodes = status.nodes.len(),
                "runtime status loaded"
            );
        }
        self.canvas.complete_runtime_fetch(ticket, result);
    }

    /// Re-read the run index. Snapshots memoized so far are kept.
    pub fn refresh_history(&mut self) {
        let source: &mut dyn ContentSource = match self.history_source.as_mut() {
            Some(s) => s.as_mut(),
            None => &mut self.source,
        };
        match RunHistory::load(source, &self.history_root) {
            Ok(loaded) => {
                if let Some(h) = self.history.as_mut() {
                    h.replace_index(loaded.index().clone());
                } else {
                    self.history = Some(loaded);
                }
                self.history_availability = Availability::Ready;
            }
            Err(e) => {
                warn!(error = %e, "run history unavailable");
                self.history_availability = Availability::Unavailable(e.to_string());
            }
        }
    }

    /// Re-read the job status document, apply its live patch and update the
    /// poll lifecycle. A job that just finished triggers a runtime and run
    /// index refresh.
    pub fn refresh_job(&mut self, now: Instant) {
        let Some(path) = self.config.job_status_path.clone() else {
            return;
        };
        let ticket = self.canvas.begin_live_fetch();
        match read_json::<JobStatusDocument, S>(&mut self.source, &path, DocumentKind::JobStatus) {
            Ok(doc) => {
                let job = doc.job;
                debug!(state = ?job.state, step = job.active_step.as_deref().unwrap_or("-"), "job status loaded");
                self.canvas
                    .complete_live_fetch(ticket, job.live_patch().cloned());
                let state = job.state;
                self.job = Some(job);
                self.job_availability = Availability::Ready;
                if self.poll.observe_job(state, now) {
                    self.refresh_runtime();
                    self.refresh_history();
                }
            }
            Err(e) => {
                warn!(error = %e, "job status unavailable");
                self.canvas.complete_live_fetch(ticket, None);
                self.job_availability = Availability::Unavailable(e.to_string());
            }
        }
    }

    /// Start periodic job polling at the configured interval.
    pub fn start_polling(&mut self, now: Instant) {
        if self.config.job_status_path.is_some() {
            self.poll.start(now);
        }
    }

    pub fn stop_polling(&mut self) {
        self.poll.stop();
    }

    /// Drive the poll from the host loop. Returns true if a refresh ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.poll.poll_due(now) {
            return false;
        }
        self.refresh_job(now);
        true
    }

    // ── comparison ──────────────────────────────────────────────────────────

    pub fn comparison_selection(&self) -> &ComparisonSelection {
        &self.comparison
    }

    pub fn set_comparison(&mut self, selection: ComparisonSelection) {
        self.comparison = selection;
    }

    /// Pick the baseline by selector key (`"current"` or a run id).
    pub fn select_baseline(&mut self, key: &str) {
        self.comparison.baseline = Some(RunSelection::from_key(key));
    }

    pub fn select_current(&mut self, key: &str) {
        self.comparison.current = RunSelection::from_key(key);
    }

    /// Resolve a selection against the live snapshot and run history.
    pub fn resolve(&mut self, selection: &RunSelection) -> Option<RuntimeStatus> {
        let current = self.canvas.runtime();
        match (&mut self.history, selection) {
            (_, RunSelection::Current) => current.cloned(),
            (None, RunSelection::Run(run_id)) => {
                debug!(run_id = %run_id, "no run history to resolve against");
                None
            }
            (Some(history), RunSelection::Run(_)) => {
                let source: &mut dyn ContentSource = match self.history_source.as_mut() {
                    Some(s) => s.as_mut(),
                    None => &mut self.source,
                };
                history.resolve_owned(selection, current, source)
            }
        }
    }

    /// Delta summary of the current comparison selection.
    pub fn comparison(&mut self) -> DeltaSummary {
        let selection = self.comparison.clone();
        let current = self.resolve(&selection.current);
        let baseline = selection.baseline.as_ref().and_then(|b| self.resolve(b));
        compare(current.as_ref(), baseline.as_ref())
    }
}

/// Open a session over the local filesystem, surfacing a layout failure with
/// context for the CLI.
pub fn open_fs_session(
    config: DashboardConfig,
) -> anyhow::Result<DashboardSession<crate::source::FsSource>> {
    let layout = config.layout_path.clone();
    DashboardSession::open(config, crate::source::FsSource)
        .with_context(|| format!("Failed to open dashboard layout {}", layout))
}

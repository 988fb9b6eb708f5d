//! Caller-owned, cancelable periodic refresh.
//!
//! There is no ambient timer: the host drives [`PollTask::poll_due`] from its
//! own event loop (a frame callback, a tokio interval, a test clock).

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::status::JobState;

#[derive(Debug, Clone)]
pub struct PollTask {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PollTask {
    /// A stopped task with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start (or restart) polling; the first tick is due immediately.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            info!(interval_ms = self.interval.as_millis() as u64, "polling started");
        }
        self.next_due = Some(now);
    }

    pub fn stop(&mut self) {
        if self.next_due.take().is_some() {
            info!("polling stopped");
        }
    }

    /// True when a tick is due at `now`; schedules the next tick.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time until the next tick, for hosts that sleep or request a repaint.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Tie the poll lifecycle to the job: active jobs keep it running,
    /// terminal ones stop it. Returns true if this call stopped the task.
    pub fn observe_job(&mut self, state: JobState, now: Instant) -> bool {
        if state.is_terminal() && self.is_active() {
            debug!(?state, "job reached a terminal state");
            self.stop();
            return true;
        }
        if state.is_active() && !self.is_active() {
            self.next_due = Some(now + self.interval);
            info!(interval_ms = self.interval.as_millis() as u64, "polling started");
        }
        false
    }
}

//! Ordering guard for asynchronous document fetches.
//!
//! Each fetch is tagged with a monotonically increasing [`RequestTicket`].
//! A response is applied only when its ticket is newer than the last applied
//! one, so a slow response can never overwrite state from a later request.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchSequencer {
    issued: u64,
    applied: u64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a new request.
    pub fn issue(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    /// Returns true and records the ticket if its response should be applied.
    pub fn accept(&mut self, ticket: RequestTicket) -> bool {
        if ticket.0 <= self.applied || ticket.0 > self.issued {
            debug!(
                ticket = ticket.0,
                applied = self.applied,
                "discarding stale response"
            );
            return false;
        }
        self.applied = ticket.0;
        true
    }
}

/// Display state of an optional document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    NotRequested,
    Loading,
    Ready,
    /// The last fetch failed; shown as "data unavailable". Not retried.
    Unavailable(String),
}

impl Availability {
    pub fn is_ready(&self) -> bool {
        matches!(self, Availability::Ready)
    }

    pub fn label(&self) -> String {
        match self {
            Availability::NotRequested => "not loaded".to_string(),
            Availability::Loading => "loading…".to_string(),
            Availability::Ready => "ok".to_string(),
            Availability::Unavailable(reason) => format!("data unavailable ({reason})"),
        }
    }
}

//! Error taxonomy for loading and resolving dashboard documents.

use std::fmt;

/// Which external document an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Layout,
    RuntimeStatus,
    RunIndex,
    RunSnapshot,
    JobStatus,
}

impl DocumentKind {
    /// Only the layout is mandatory; everything else degrades to "no data".
    pub fn is_mandatory(self) -> bool {
        matches!(self, DocumentKind::Layout)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Layout => "layout",
            DocumentKind::RuntimeStatus => "runtime status",
            DocumentKind::RunIndex => "run index",
            DocumentKind::RunSnapshot => "run snapshot",
            DocumentKind::JobStatus => "job status",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Transport or parse failure: the document could not be read as JSON.
    #[error("failed to load {document} from {location}: {reason}")]
    Load {
        document: DocumentKind,
        location: String,
        reason: String,
    },

    /// The document parsed but its content is not usable.
    #[error("{document} at {location} is invalid: {reason}")]
    Schema {
        document: DocumentKind,
        location: String,
        reason: String,
    },

    /// A reference to a node or run that does not exist.
    #[error("unresolved {document} reference: {reference}")]
    Resolution {
        document: DocumentKind,
        reference: String,
    },
}

impl DashboardError {
    pub fn document(&self) -> DocumentKind {
        match self {
            DashboardError::Load { document, .. }
            | DashboardError::Schema { document, .. }
            | DashboardError::Resolution { document, .. } => *document,
        }
    }

    /// Fatal errors block initialization; the rest degrade to an empty state.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DashboardError::Resolution { .. }) && self.document().is_mandatory()
    }

    /// Classify a `serde_json` failure: syntax problems are load errors,
    /// well-formed JSON with the wrong shape is a schema error.
    pub fn from_json(document: DocumentKind, location: &str, err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => DashboardError::Schema {
                document,
                location: location.to_string(),
                reason: err.to_string(),
            },
            _ => DashboardError::Load {
                document,
                location: location.to_string(),
                reason: err.to_string(),
            },
        }
    }
}

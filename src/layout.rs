//! Loading, validating and navigating the layout document.

use std::collections::HashSet;

use camino::Utf8Path;
use tracing::{debug, info};

use crate::error::{DashboardError, DocumentKind};
use crate::geometry::clamp_node_position;
use crate::model::{Layout, View};
use crate::source::{ContentSource, read_json};

/// Load the layout from `path` and validate it.
///
/// Any failure here is fatal to initialization: callers must show an error
/// state rather than a partially built graph.
pub fn load_layout<S: ContentSource + ?Sized>(
    source: &mut S,
    path: &Utf8Path,
) -> Result<Layout, DashboardError> {
    let layout: Layout = read_json(source, path, DocumentKind::Layout)?;
    let layout = prepare_layout(layout, path.as_str())?;
    info!(
        path = %path,
        views = layout.views.len(),
        "layout loaded"
    );
    Ok(layout)
}

/// Parse a layout from an in-memory JSON string.
pub fn parse_layout(json: &str) -> Result<Layout, DashboardError> {
    let layout: Layout = serde_json::from_str(json)
        .map_err(|e| DashboardError::from_json(DocumentKind::Layout, "<memory>", e))?;
    prepare_layout(layout, "<memory>")
}

fn prepare_layout(mut layout: Layout, location: &str) -> Result<Layout, DashboardError> {
    validate_layout(&layout, location)?;
    for view in &mut layout.views {
        let canvas = view.canvas_size();
        for node in &mut view.nodes {
            let clamped = clamp_node_position(node.position(), canvas);
            if clamped != node.position() {
                debug!(view = %view.id, node = %node.id, "initial node position clamped to canvas");
                node.set_position(clamped);
            }
        }
    }
    Ok(layout)
}

/// Semantic checks that serde cannot express.
pub fn validate_layout(layout: &Layout, location: &str) -> Result<(), DashboardError> {
    let schema = |reason: String| DashboardError::Schema {
        document: DocumentKind::Layout,
        location: location.to_string(),
        reason,
    };

    if layout.views.is_empty() {
        return Err(schema("layout contains no views".to_string()));
    }

    let mut view_ids = HashSet::new();
    for view in &layout.views {
        if !view_ids.insert(view.id.as_str()) {
            return Err(schema(format!("duplicate view id '{}'", view.id)));
        }
        let c = view.canvas;
        if !(c.width.is_finite() && c.height.is_finite() && c.width > 0.0 && c.height > 0.0) {
            return Err(schema(format!(
                "view '{}' has an invalid canvas {}x{}",
                view.id, c.width, c.height
            )));
        }
        let mut node_ids = HashSet::new();
        for node in &view.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(schema(format!(
                    "view '{}' has duplicate node id '{}'",
                    view.id, node.id
                )));
            }
            if !(node.x.is_finite() && node.y.is_finite()) {
                return Err(schema(format!(
                    "node '{}' in view '{}' has a non-finite position",
                    node.id, view.id
                )));
            }
        }
    }
    Ok(())
}

/// Resolve a view by id. Returns `None` when no view has that id.
pub fn resolve_view<'a>(layout: &'a Layout, id: &str) -> Option<&'a View> {
    layout.views.iter().find(|v| v.id == id)
}

/// Index of a view by id.
pub fn view_index(layout: &Layout, id: &str) -> Option<usize> {
    layout.views.iter().position(|v| v.id == id)
}

/// `(id, name)` pairs of every view, in document order, for view selectors.
pub fn collect_view_choices(layout: &Layout) -> Vec<(String, String)> {
    layout
        .views
        .iter()
        .map(|v| (v.id.clone(), v.name.clone()))
        .collect()
}

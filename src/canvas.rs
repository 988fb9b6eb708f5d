//! The explicit application state of the graph canvas.
//!
//! [`CanvasState`] owns the layout, the active view, the viewport transform,
//! the type filter, the status inputs and the derived render state (effective
//! statuses and routed connections). Hosts pass it to renderers and feed it
//! input events; nothing here is global.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::error::{DashboardError, DocumentKind};
use crate::fetch::{Availability, FetchSequencer, RequestTicket};
use crate::geometry::{Point, Rect, clamp_node_position};
use crate::interaction::{
    HitTarget, InputEvent, InteractionController, InteractionEffect, InteractionTarget,
};
use crate::layout::{validate_layout, view_index};
use crate::model::{Layout, NodeType, View};
use crate::overlay::{StatusMap, effective_status};
use crate::router::{FlowState, PathSpec, derive_flow_state, route};
use crate::status::{LiveNodePatch, RuntimeStatus};
use crate::viewport::Transform;

/// A connection with both endpoints resolved, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedConnection {
    pub id: String,
    pub from: String,
    pub to: String,
    pub path: PathSpec,
    pub flow: FlowState,
    /// False when either endpoint's type is filtered out.
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct CanvasState {
    layout: Layout,
    active_view: usize,
    transform: Transform,
    active_types: BTreeSet<NodeType>,
    runtime: Option<RuntimeStatus>,
    runtime_availability: Availability,
    runtime_seq: FetchSequencer,
    live_patch: Option<LiveNodePatch>,
    live_seq: FetchSequencer,
    effective: StatusMap,
    routes: Vec<RoutedConnection>,
    controller: InteractionController,
}

impl CanvasState {
    /// Build the canvas for a layout, showing its first view.
    ///
    /// The layout is checked with [`validate_layout`] first, so a hand-built
    /// layout without views is a schema error rather than a panic later.
    pub fn new(layout: Layout) -> Result<Self, DashboardError> {
        validate_layout(&layout, "<canvas>")?;
        let mut state = Self {
            layout,
            active_view: 0,
            transform: Transform::DEFAULT,
            active_types: NodeType::ALL.into_iter().collect(),
            runtime: None,
            runtime_availability: Availability::NotRequested,
            runtime_seq: FetchSequencer::new(),
            live_patch: None,
            live_seq: FetchSequencer::new(),
            effective: StatusMap::default(),
            routes: Vec::new(),
            controller: InteractionController::new(),
        };
        state.refresh_status();
        state.rebuild_routes(true);
        Ok(state)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn view(&self) -> &View {
        &self.layout.views[self.active_view]
    }

    pub fn view_index(&self) -> usize {
        self.active_view
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    // ── view selection ──────────────────────────────────────────────────────

    /// Switch the active view.
    ///
    /// Ends every drag session first, resets the transform and re-derives all
    /// render state. Returns the pointer releases the host should perform.
    pub fn select_view(&mut self, id: &str) -> Result<Vec<InteractionEffect>, DashboardError> {
        let index = view_index(&self.layout, id).ok_or_else(|| DashboardError::Resolution {
            document: DocumentKind::Layout,
            reference: format!("view '{id}'"),
        })?;
        let released = self.controller.reset();
        self.active_view = index;
        self.transform = Transform::DEFAULT;
        self.refresh_status();
        self.rebuild_routes(true);
        info!(view = %id, "view selected");
        Ok(released)
    }

    // ── type filter ─────────────────────────────────────────────────────────

    pub fn active_types(&self) -> &BTreeSet<NodeType> {
        &self.active_types
    }

    pub fn is_type_active(&self, t: NodeType) -> bool {
        self.active_types.contains(&t)
    }

    pub fn set_active_types(&mut self, types: impl IntoIterator<Item = NodeType>) {
        self.active_types = types.into_iter().collect();
        self.rebuild_routes(false);
    }

    /// Flip one type; returns whether it is now shown.
    pub fn toggle_type(&mut self, t: NodeType) -> bool {
        let shown = if self.active_types.remove(&t) {
            false
        } else {
            self.active_types.insert(t);
            true
        };
        self.rebuild_routes(false);
        shown
    }

    pub fn is_node_visible(&self, id: &str) -> bool {
        self.view()
            .node(id)
            .is_some_and(|n| self.is_type_active(n.node_type))
    }

    pub fn node_position(&self, id: &str) -> Option<Point> {
        self.view().node(id).map(|n| n.position())
    }

    // ── status inputs ───────────────────────────────────────────────────────

    pub fn runtime(&self) -> Option<&RuntimeStatus> {
        self.runtime.as_ref()
    }

    pub fn runtime_availability(&self) -> &Availability {
        &self.runtime_availability
    }

    pub fn live_patch(&self) -> Option<&LiveNodePatch> {
        self.live_patch.as_ref()
    }

    pub fn effective_status(&self) -> &StatusMap {
        &self.effective
    }

    /// Tag a runtime-status request.
    pub fn begin_runtime_fetch(&mut self) -> RequestTicket {
        if !self.runtime_availability.is_ready() {
            self.runtime_availability = Availability::Loading;
        }
        self.runtime_seq.issue()
    }

    /// Apply a runtime-status response. Stale responses are discarded and
    /// `false` is returned. A failed fetch empties the snapshot and marks the
    /// document unavailable; the graph keeps rendering with idle statuses.
    pub fn complete_runtime_fetch(
        &mut self,
        ticket: RequestTicket,
        result: Result<RuntimeStatus, DashboardError>,
    ) -> bool {
        if !self.runtime_seq.accept(ticket) {
            return false;
        }
        match result {
            Ok(status) => {
                self.runtime = Some(status);
                self.runtime_availability = Availability::Ready;
            }
            Err(e) => {
                warn!(error = %e, "runtime status unavailable");
                self.runtime = None;
                self.runtime_availability = Availability::Unavailable(e.to_string());
            }
        }
        self.refresh_status();
        true
    }

    /// Tag a live-patch request.
    pub fn begin_live_fetch(&mut self) -> RequestTicket {
        self.live_seq.issue()
    }

    /// Apply a live patch response (`None` clears the overlay).
    pub fn complete_live_fetch(&mut self, ticket: RequestTicket, patch: Option<LiveNodePatch>) -> bool {
        if !self.live_seq.accept(ticket) {
            return false;
        }
        self.live_patch = patch;
        self.refresh_status();
        true
    }

    /// Replace the runtime snapshot directly (synchronous hosts and tests).
    pub fn set_runtime(&mut self, runtime: Option<RuntimeStatus>) {
        let ticket = self.begin_runtime_fetch();
        match runtime {
            Some(status) => {
                self.complete_runtime_fetch(ticket, Ok(status));
            }
            None => {
                self.runtime_seq.accept(ticket);
                self.runtime = None;
                self.runtime_availability = Availability::NotRequested;
                self.refresh_status();
            }
        }
    }

    /// Replace the live patch directly.
    pub fn set_live_patch(&mut self, patch: Option<LiveNodePatch>) {
        let ticket = self.begin_live_fetch();
        self.complete_live_fetch(ticket, patch);
    }

    // ── input ───────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<InteractionEffect> {
        let mut controller = std::mem::take(&mut self.controller);
        let effects = controller.handle(event, self);
        self.controller = controller;
        effects
    }

    /// The topmost visible node under a screen point, else the canvas.
    pub fn hit_test(&self, screen: Point) -> HitTarget {
        let graph = self.transform.to_graph_space(screen);
        self.view()
            .nodes
            .iter()
            .rev()
            .filter(|n| self.is_type_active(n.node_type))
            .find(|n| Rect::node_card(n.position()).contains(graph))
            .map(|n| HitTarget::Node(n.id.clone()))
            .unwrap_or(HitTarget::Canvas)
    }

    // ── derived state ───────────────────────────────────────────────────────

    pub fn routes(&self) -> &[RoutedConnection] {
        &self.routes
    }

    pub fn visible_routes(&self) -> impl Iterator<Item = &RoutedConnection> {
        self.routes.iter().filter(|r| r.visible)
    }

    fn refresh_status(&mut self) {
        self.effective = effective_status(self.runtime.as_ref(), self.live_patch.as_ref());
        self.rebuild_routes(false);
    }

    /// Recompute every connection path and flow state of the active view.
    fn rebuild_routes(&mut self, log_dropped: bool) {
        let view = &self.layout.views[self.active_view];
        let mut routes = Vec::with_capacity(view.connections.len());
        for c in &view.connections {
            let Some((from, to)) = view.endpoints(c) else {
                if log_dropped {
                    debug!(view = %view.id, connection = %c.id, "connection endpoint missing; skipped");
                }
                continue;
            };
            routes.push(RoutedConnection {
                id: c.id.clone(),
                from: c.from.clone(),
                to: c.to.clone(),
                path: route(from, to),
                flow: derive_flow_state(
                    self.effective.status(&from.id),
                    self.effective.status(&to.id),
                ),
                visible: self.active_types.contains(&from.node_type)
                    && self.active_types.contains(&to.node_type),
            });
        }
        self.routes = routes;
    }
}

impl InteractionTarget for CanvasState {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn draggable_node_origin(&self, node: &str) -> Option<Point> {
        self.view()
            .node(node)
            .filter(|n| self.is_type_active(n.node_type))
            .map(|n| n.position())
    }

    fn move_node(&mut self, node: &str, position: Point) -> Option<Point> {
        let view = &mut self.layout.views[self.active_view];
        let canvas = view.canvas_size();
        let n = view.node_mut(node)?;
        let applied = clamp_node_position(position, canvas);
        n.set_position(applied);
        self.rebuild_routes(false);
        Some(applied)
    }
}

//! Target-agnostic draw calls for one frame of the active view.
//!
//! [`build_scene`] turns a [`CanvasState`] into an ordered list of
//! [`DrawCall`]s in graph coordinates: groups first, then connections (echo
//! stroke below primary stroke), then node cards. Backends implement
//! [`SceneRenderer`] and apply the scene's transform themselves.

use serde::Serialize;

use crate::canvas::CanvasState;
use crate::geometry::{Rect, Size};
use crate::model::NodeType;
use crate::node_types::{NodeTypeStyle, node_type_style};
use crate::overlay::{StatusStyle, flow_style, status_style, status_tooltip};
use crate::router::{FlowState, PathSpec};
use crate::status::NodeStatus;
use crate::viewport::Transform;

/// The two strokes drawn for every connection along the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeVariant {
    /// Wide, translucent stroke underneath; carries the flow glow.
    Echo,
    Primary,
}

impl StrokeVariant {
    pub fn width(self) -> f64 {
        match self {
            StrokeVariant::Echo => 9.0,
            StrokeVariant::Primary => 2.5,
        }
    }

    pub fn opacity(self) -> f64 {
        match self {
            StrokeVariant::Echo => 0.25,
            StrokeVariant::Primary => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrokeVariant::Echo => "echo",
            StrokeVariant::Primary => "primary",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeCard {
    pub id: String,
    pub node_type: NodeType,
    pub label: String,
    pub subtitle: Option<String>,
    /// Node icon, or the type's default glyph.
    pub icon: Option<String>,
    pub rect: Rect,
    pub status: NodeStatus,
    pub tooltip: String,
    pub style: NodeTypeStyle,
    pub status_style: StatusStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Group {
        rect: Rect,
        label: String,
    },
    Connection {
        id: String,
        path: PathSpec,
        stroke: StrokeVariant,
        flow: FlowState,
        style: StatusStyle,
    },
    Node(NodeCard),
}

/// Everything a backend needs to draw the active view.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub title: Option<String>,
    pub view_id: String,
    pub view_name: String,
    pub canvas: Size,
    pub transform: Transform,
    pub calls: Vec<DrawCall>,
}

impl Scene {
    pub fn node_cards(&self) -> impl Iterator<Item = &NodeCard> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Node(card) => Some(card),
            _ => None,
        })
    }

    pub fn node(&self, id: &str) -> Option<&NodeCard> {
        self.node_cards().find(|c| c.id == id)
    }

    /// Connection ids in draw order, one per connection (primary strokes).
    pub fn connection_ids(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Connection {
                    id,
                    stroke: StrokeVariant::Primary,
                    ..
                } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Build the draw list for the active view. Filtered-out nodes and their
/// connections are omitted.
pub fn build_scene(state: &CanvasState) -> Scene {
    let view = state.view();
    let statuses = state.effective_status();
    let mut calls = Vec::with_capacity(
        view.groups.len() + 2 * state.routes().len() + view.nodes.len(),
    );

    for g in &view.groups {
        calls.push(DrawCall::Group {
            rect: Rect::new(g.x, g.y, g.width, g.height),
            label: g.label.clone(),
        });
    }

    for r in state.visible_routes() {
        for stroke in [StrokeVariant::Echo, StrokeVariant::Primary] {
            calls.push(DrawCall::Connection {
                id: r.id.clone(),
                path: r.path,
                stroke,
                flow: r.flow,
                style: flow_style(r.flow),
            });
        }
    }

    for n in view.nodes.iter().filter(|n| state.is_type_active(n.node_type)) {
        let entry = statuses.get(&n.id);
        let style = node_type_style(n.node_type);
        calls.push(DrawCall::Node(NodeCard {
            id: n.id.clone(),
            node_type: n.node_type,
            label: n.label.clone(),
            subtitle: n.subtitle.clone().filter(|s| !s.is_empty()),
            icon: n
                .icon
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| style.default_icon.map(str::to_string)),
            rect: Rect::node_card(n.position()),
            status: entry.status,
            tooltip: status_tooltip(entry),
            status_style: status_style(entry.status),
            style,
        }));
    }

    Scene {
        title: state.layout().meta.title.clone(),
        view_id: view.id.clone(),
        view_name: view.name.clone(),
        canvas: view.canvas_size(),
        transform: state.transform(),
        calls,
    }
}

/// A drawing backend.
pub trait SceneRenderer {
    type Output;

    fn begin(&mut self, scene: &Scene);
    fn draw(&mut self, call: &DrawCall, transform: Transform);
    fn finish(&mut self) -> Self::Output;
}

/// Drive `renderer` over every call of `scene` in order.
pub fn render_scene<R: SceneRenderer + ?Sized>(renderer: &mut R, scene: &Scene) -> R::Output {
    renderer.begin(scene);
    for call in &scene.calls {
        renderer.draw(call, scene.transform);
    }
    renderer.finish()
}

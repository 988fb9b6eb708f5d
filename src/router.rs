//! Connection routing: cubic bezier paths between node cards and the flow
//! state a connection shows given its endpoints' statuses.

use std::fmt;

use serde::Serialize;

use crate::geometry::{NODE_HEIGHT, NODE_WIDTH, Point};
use crate::model::Node;
use crate::status::NodeStatus;

pub const MIN_CURVE: f64 = 80.0;
pub const MAX_CURVE: f64 = 290.0;

/// A cubic bezier from `start` to `end` with two control points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathSpec {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl PathSpec {
    /// SVG path data, e.g. `M 210 38 C 290 38, 220 38, 300 38`.
    pub fn to_svg_d(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            fmt_num(self.start.x),
            fmt_num(self.start.y),
            fmt_num(self.control1.x),
            fmt_num(self.control1.y),
            fmt_num(self.control2.x),
            fmt_num(self.control2.y),
            fmt_num(self.end.x),
            fmt_num(self.end.y),
        )
    }
}

fn fmt_num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

/// Which side of the source card the path leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDirection {
    /// Source right edge to target left edge.
    LeftToRight,
    /// Source left edge to target right edge.
    RightToLeft,
}

pub fn route_direction(source: &Node, target: &Node) -> RouteDirection {
    if source.x <= target.x {
        RouteDirection::LeftToRight
    } else {
        RouteDirection::RightToLeft
    }
}

/// Horizontal bend of the curve, clamped to `[MIN_CURVE, MAX_CURVE]`.
pub fn curve_magnitude(start: Point, end: Point) -> f64 {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    (0.5 * dx + 0.2 * dy).clamp(MIN_CURVE, MAX_CURVE)
}

/// Route a connection between two node cards.
///
/// Anchors sit at the vertical center of each card; the path is always
/// horizontally biased so it leaves and enters cards side-on.
pub fn route(source: &Node, target: &Node) -> PathSpec {
    let sy = source.y + NODE_HEIGHT / 2.0;
    let ty = target.y + NODE_HEIGHT / 2.0;
    let direction = route_direction(source, target);
    let (start, end, sign) = match direction {
        RouteDirection::LeftToRight => (
            Point::new(source.x + NODE_WIDTH, sy),
            Point::new(target.x, ty),
            1.0,
        ),
        RouteDirection::RightToLeft => (
            Point::new(source.x, sy),
            Point::new(target.x + NODE_WIDTH, ty),
            -1.0,
        ),
    };
    let bend = curve_magnitude(start, end) * sign;
    PathSpec {
        start,
        control1: Point::new(start.x + bend, start.y),
        control2: Point::new(end.x - bend, end.y),
        end,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Flow state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowState {
    #[default]
    Idle,
    Running,
    Done,
    Fail,
}

impl FlowState {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::Running => "running",
            FlowState::Done => "done",
            FlowState::Fail => "fail",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the flow state of a connection from its endpoint statuses.
///
/// Rules are checked in order: any `fail`, any `running`, both `done`,
/// exactly one `done`, otherwise idle. The one-`done` case reports `running`
/// so the edge reads as "in transit" towards the stage that has not finished;
/// this is a display heuristic and says nothing about the downstream node's
/// real status.
pub fn derive_flow_state(from: NodeStatus, to: NodeStatus) -> FlowState {
    let either = |s: NodeStatus| from == s || to == s;
    if either(NodeStatus::Fail) {
        FlowState::Fail
    } else if either(NodeStatus::Running) {
        FlowState::Running
    } else if from == NodeStatus::Done && to == NodeStatus::Done {
        FlowState::Done
    } else if either(NodeStatus::Done) {
        FlowState::Running
    } else {
        FlowState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(12.345), "12.35");
        assert_eq!(fmt_num(-3.5), "-3.5");
    }
}

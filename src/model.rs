use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Point, Size};

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// The layout document: a title block and one or more views of the pipeline.
///
/// Loaded once per session. Apart from node positions, which the user may
/// drag, the layout is never mutated after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub meta: LayoutMeta,
    pub views: Vec<View>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// View
// ────────────────────────────────────────────────────────────────────────────

/// One named arrangement of nodes, groups and connections on a fixed canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
    pub canvas: Canvas,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl View {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas.width, self.canvas.height)
    }

    /// Look up both endpoints of a connection; `None` if either is missing.
    pub fn endpoints(&self, c: &Connection) -> Option<(&Node, &Node)> {
        Some((self.node(&c.from)?, self.node(&c.to)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

/// Decorative background region. Never referenced by nodes or connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub label: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Node
// ────────────────────────────────────────────────────────────────────────────

/// Kind of pipeline stage a node represents. Drives styling and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Pi,
    Function,
    Agent,
    Tool,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Pi,
        NodeType::Function,
        NodeType::Agent,
        NodeType::Tool,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Pi => "pi",
            NodeType::Function => "function",
            NodeType::Agent => "agent",
            NodeType::Tool => "tool",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline stage card. `x`/`y` is the top-left corner in canvas units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }
}

/// Directed edge between two nodes of the same view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub from: String,
    pub to: String,
}

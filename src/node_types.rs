//! Per-node-type visual configuration.
//!
//! A read-only table of card colors, default glyphs and legend labels shared
//! by every renderer.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::model::NodeType;

/// Simple RGB color independent of any UI toolkit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb` for SVG/CSS.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Style for a specific node type.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTypeStyle {
    /// Card fill.
    pub background: Rgb,
    /// Card outline.
    pub border: Rgb,
    /// Legend / badge color.
    pub accent: Rgb,
    /// Glyph shown when the node has no icon of its own.
    pub default_icon: Option<&'static str>,
    /// Human readable legend label.
    pub legend: &'static str,
}

impl Default for NodeTypeStyle {
    fn default() -> Self {
        Self {
            background: Rgb(30, 41, 59),
            border: Rgb(71, 85, 105),
            accent: Rgb(148, 163, 184),
            default_icon: None,
            legend: "Node",
        }
    }
}

fn style_table() -> HashMap<NodeType, NodeTypeStyle> {
    let mut m = HashMap::new();
    m.insert(
        NodeType::Pi,
        NodeTypeStyle {
            accent: Rgb(168, 85, 247),
            border: Rgb(126, 34, 206),
            default_icon: Some("π"),
            legend: "Orchestrator",
            ..Default::default()
        },
    );
    m.insert(
        NodeType::Function,
        NodeTypeStyle {
            accent: Rgb(56, 189, 248),
            border: Rgb(2, 132, 199),
            default_icon: Some("ƒ"),
            legend: "Function",
            ..Default::default()
        },
    );
    m.insert(
        NodeType::Agent,
        NodeTypeStyle {
            accent: Rgb(251, 191, 36),
            border: Rgb(217, 119, 6),
            default_icon: Some("◆"),
            legend: "Agent",
            ..Default::default()
        },
    );
    m.insert(
        NodeType::Tool,
        NodeTypeStyle {
            accent: Rgb(45, 212, 191),
            border: Rgb(13, 148, 136),
            default_icon: Some("⚙"),
            legend: "Tool",
            ..Default::default()
        },
    );
    m
}

static STYLES: Lazy<HashMap<NodeType, NodeTypeStyle>> = Lazy::new(style_table);

/// Style for `node_type`, falling back to the default style.
pub fn node_type_style(node_type: NodeType) -> NodeTypeStyle {
    STYLES.get(&node_type).cloned().unwrap_or_default()
}

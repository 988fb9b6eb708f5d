//! SVG backend for [`SceneRenderer`].

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::geometry::Rect;
use crate::scene::{DrawCall, NodeCard, Scene, SceneRenderer, render_scene};
use crate::viewport::Transform;

const GROUP_FILL: &str = "#0f172a";
const GROUP_STROKE: &str = "#334155";
const LABEL_COLOR: &str = "#e2e8f0";
const MUTED_COLOR: &str = "#94a3b8";

/// Renders a scene into a standalone SVG document.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    out: String,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn rect(&mut self, r: &Rect, rx: f64, fill: &str, stroke: &str, extra: &str) {
        let _ = writeln!(
            self.out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{rx}" fill="{fill}" stroke="{stroke}"{extra}/>"#,
            r.left(),
            r.top(),
            r.size.width,
            r.size.height
        );
    }

    fn text(&mut self, x: f64, y: f64, size: u32, fill: &str, anchor: &str, body: &str) {
        let _ = writeln!(
            self.out,
            r#"<text x="{x}" y="{y}" font-size="{size}" fill="{fill}" text-anchor="{anchor}">{}</text>"#,
            encode_text(body)
        );
    }

    fn node(&mut self, card: &NodeCard) {
        let _ = writeln!(
            self.out,
            r#"<g class="node node-{}" data-id="{}" data-status="{}">"#,
            card.node_type,
            encode_double_quoted_attribute(&card.id),
            card.status_style.attribute
        );
        let _ = writeln!(self.out, "<title>{}</title>", encode_text(&card.tooltip));
        let r = card.rect;
        self.rect(
            &r,
            10.0,
            &card.style.background.to_hex(),
            &card.style.border.to_hex(),
            r#" stroke-width="1.5""#,
        );
        // status stripe along the left edge
        self.rect(
            &Rect::new(r.left(), r.top(), 5.0, r.size.height),
            2.0,
            &card.status_style.color.to_hex(),
            "none",
            "",
        );
        let text_x = r.left() + 44.0;
        if let Some(icon) = &card.icon {
            self.text(r.left() + 24.0, r.top() + 34.0, 18, &card.style.accent.to_hex(), "middle", icon);
        }
        self.text(text_x, r.top() + 30.0, 14, LABEL_COLOR, "start", &card.label);
        if let Some(sub) = &card.subtitle {
            self.text(text_x, r.top() + 50.0, 11, MUTED_COLOR, "start", sub);
        }
        self.text(
            r.right() - 10.0,
            r.bottom() - 10.0,
            10,
            &card.status_style.color.to_hex(),
            "end",
            card.status_style.label,
        );
        self.out.push_str("</g>\n");
    }
}

impl SceneRenderer for SvgRenderer {
    type Output = String;

    fn begin(&mut self, scene: &Scene) {
        self.out.clear();
        let (w, h) = (scene.canvas.width, scene.canvas.height);
        let _ = writeln!(
            self.out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-view="{}">"#,
            encode_double_quoted_attribute(&scene.view_id)
        );
        let title = match &scene.title {
            Some(t) => format!("{t} | {}", scene.view_name),
            None => scene.view_name.clone(),
        };
        let _ = writeln!(self.out, "<title>{}</title>", encode_text(&title));
        let Transform { x, y, scale } = scene.transform;
        let _ = writeln!(
            self.out,
            r#"<g transform="translate({x} {y}) scale({scale})" font-family="sans-serif">"#
        );
    }

    fn draw(&mut self, call: &DrawCall, _transform: Transform) {
        match call {
            DrawCall::Group { rect, label } => {
                self.rect(rect, 14.0, GROUP_FILL, GROUP_STROKE, r#" stroke-dasharray="6 4""#);
                if !label.is_empty() {
                    self.text(rect.left() + 14.0, rect.top() + 22.0, 12, MUTED_COLOR, "start", label);
                }
            }
            DrawCall::Connection {
                id,
                path,
                stroke,
                flow,
                style,
            } => {
                let _ = writeln!(
                    self.out,
                    r#"<path class="connection {}" data-id="{}" data-flow="{flow}" d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-opacity="{}" stroke-linecap="round"/>"#,
                    stroke.as_str(),
                    encode_double_quoted_attribute(id),
                    path.to_svg_d(),
                    style.color.to_hex(),
                    stroke.width(),
                    stroke.opacity()
                );
            }
            DrawCall::Node(card) => self.node(card),
        }
    }

    fn finish(&mut self) -> String {
        self.out.push_str("</g>\n</svg>\n");
        std::mem::take(&mut self.out)
    }
}

/// Render `scene` to an SVG string.
pub fn scene_to_svg(scene: &Scene) -> String {
    render_scene(&mut SvgRenderer::new(), scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn test_escapes_labels() {
        let scene = Scene {
            title: Some("A & B".into()),
            view_id: "v\"1".into(),
            view_name: "<main>".into(),
            canvas: Size::new(100.0, 50.0),
            transform: Transform::DEFAULT,
            calls: vec![DrawCall::Group {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                label: "<grp>".into(),
            }],
        };
        let svg = scene_to_svg(&scene);
        assert!(svg.contains("A &amp; B | &lt;main&gt;"));
        assert!(svg.contains("&lt;grp&gt;"));
        assert!(svg.contains(r#"data-view="v&quot;1""#));
        assert!(svg.ends_with("</svg>\n"));
    }
}

#![cfg(feature = "egui")]

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Stroke, StrokeKind};
use egui::epaint::CubicBezierShape;

use crate::geometry::{Point, Rect};
use crate::node_types::Rgb;
use crate::scene::{DrawCall, NodeCard, Scene, SceneRenderer};
use crate::viewport::Transform;

pub fn rgb_to_color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

/// Paints draw calls onto an egui painter. `origin` is the screen position of
/// the canvas container's top-left corner.
pub struct EguiSceneRenderer<'a> {
    painter: &'a egui::Painter,
    origin: Pos2,
}

impl<'a> EguiSceneRenderer<'a> {
    pub fn new(painter: &'a egui::Painter, origin: Pos2) -> Self {
        Self { painter, origin }
    }

    fn to_screen(&self, transform: Transform, p: Point) -> Pos2 {
        let s = transform.to_screen_space(p);
        Pos2::new(self.origin.x + s.x as f32, self.origin.y + s.y as f32)
    }

    fn to_screen_rect(&self, transform: Transform, r: &Rect) -> egui::Rect {
        let min = self.to_screen(transform, r.min);
        let max = self.to_screen(transform, Point::new(r.right(), r.bottom()));
        egui::Rect::from_min_max(min, max)
    }

    fn node(&self, card: &NodeCard, transform: Transform) {
        let scale = transform.scale as f32;
        let r = self.to_screen_rect(transform, &card.rect);
        self.painter
            .rect_filled(r, 10.0 * scale, rgb_to_color32(card.style.background));
        self.painter.rect_stroke(
            r,
            10.0 * scale,
            Stroke::new(1.5, rgb_to_color32(card.style.border)),
            StrokeKind::Inside,
        );
        let stripe = egui::Rect::from_min_size(r.min, egui::vec2(5.0 * scale, r.height()));
        self.painter
            .rect_filled(stripe, 2.0 * scale, rgb_to_color32(card.status_style.color));

        if let Some(icon) = &card.icon {
            self.painter.text(
                Pos2::new(r.left() + 24.0 * scale, r.center().y),
                Align2::CENTER_CENTER,
                icon,
                FontId::proportional(18.0 * scale),
                rgb_to_color32(card.style.accent),
            );
        }
        let text_x = r.left() + 44.0 * scale;
        self.painter.text(
            Pos2::new(text_x, r.top() + 24.0 * scale),
            Align2::LEFT_CENTER,
            &card.label,
            FontId::proportional(14.0 * scale),
            Color32::from_rgb(226, 232, 240),
        );
        if let Some(sub) = &card.subtitle {
            self.painter.text(
                Pos2::new(text_x, r.top() + 46.0 * scale),
                Align2::LEFT_CENTER,
                sub,
                FontId::proportional(11.0 * scale),
                Color32::from_rgb(148, 163, 184),
            );
        }
        self.painter.text(
            Pos2::new(r.right() - 10.0 * scale, r.bottom() - 10.0 * scale),
            Align2::RIGHT_BOTTOM,
            card.status_style.label,
            FontId::proportional(10.0 * scale),
            rgb_to_color32(card.status_style.color),
        );
    }
}

impl SceneRenderer for EguiSceneRenderer<'_> {
    type Output = ();

    fn begin(&mut self, scene: &Scene) {
        let canvas = Rect::new(0.0, 0.0, scene.canvas.width, scene.canvas.height);
        let r = self.to_screen_rect(scene.transform, &canvas);
        self.painter
            .rect_filled(r, 0.0, Color32::from_rgb(2, 6, 23));
    }

    fn draw(&mut self, call: &DrawCall, transform: Transform) {
        match call {
            DrawCall::Group { rect, label } => {
                let r = self.to_screen_rect(transform, rect);
                let scale = transform.scale as f32;
                self.painter
                    .rect_filled(r, 14.0 * scale, Color32::from_rgb(15, 23, 42));
                self.painter.rect_stroke(
                    r,
                    14.0 * scale,
                    Stroke::new(1.0, Color32::from_rgb(51, 65, 85)),
                    StrokeKind::Inside,
                );
                if !label.is_empty() {
                    self.painter.text(
                        Pos2::new(r.left() + 14.0 * scale, r.top() + 16.0 * scale),
                        Align2::LEFT_CENTER,
                        label,
                        FontId::proportional(12.0 * scale),
                        Color32::from_rgb(148, 163, 184),
                    );
                }
            }
            DrawCall::Connection {
                path, stroke, style, ..
            } => {
                let points = [path.start, path.control1, path.control2, path.end]
                    .map(|p| self.to_screen(transform, p));
                let color = rgb_to_color32(style.color)
                    .gamma_multiply(stroke.opacity() as f32);
                let width = (stroke.width() * transform.scale) as f32;
                self.painter.add(CubicBezierShape::from_points_stroke(
                    points,
                    false,
                    Color32::TRANSPARENT,
                    Stroke::new(width, color),
                ));
            }
            DrawCall::Node(card) => self.node(card, transform),
        }
    }

    fn finish(&mut self) {}
}

//! Plain geometry types shared by the viewport, router and renderers.
//!
//! These are deliberately independent of any UI toolkit so the same core can
//! back the SVG exporter and the egui viewer.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Width of every node card in canvas units.
pub const NODE_WIDTH: f64 = 210.0;
/// Height of every node card in canvas units.
pub const NODE_HEIGHT: f64 = 76.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rectangle of a node card whose top-left corner is `origin`.
    pub fn node_card(origin: Point) -> Self {
        Self::new(origin.x, origin.y, NODE_WIDTH, NODE_HEIGHT)
    }

    pub fn left(&self) -> f64 {
        self.min.x
    }

    pub fn top(&self) -> f64 {
        self.min.y
    }

    pub fn right(&self) -> f64 {
        self.min.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.min.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.size.width / 2.0,
            self.min.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Clamp a node's top-left corner so the whole card stays on the canvas.
///
/// When the canvas is smaller than a card the lower bound (0) wins.
pub fn clamp_node_position(p: Point, canvas: Size) -> Point {
    let max_x = (canvas.width - NODE_WIDTH).max(0.0);
    let max_y = (canvas.height - NODE_HEIGHT).max(0.0);
    Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_and_outside() {
        let canvas = Size::new(800.0, 400.0);
        assert_eq!(
            clamp_node_position(Point::new(10.0, 20.0), canvas),
            Point::new(10.0, 20.0)
        );
        assert_eq!(
            clamp_node_position(Point::new(-5.0, 900.0), canvas),
            Point::new(0.0, 400.0 - NODE_HEIGHT)
        );
        assert_eq!(
            clamp_node_position(Point::new(9999.0, -1.0), canvas),
            Point::new(800.0 - NODE_WIDTH, 0.0)
        );
    }

    #[test]
    fn test_clamp_tiny_canvas() {
        let p = clamp_node_position(Point::new(50.0, 50.0), Size::new(100.0, 40.0));
        assert_eq!(p, Point::ZERO);
    }

    #[test]
    fn test_rect_center_and_contains() {
        let r = Rect::node_card(Point::new(100.0, 50.0));
        assert_eq!(r.center(), Point::new(100.0 + NODE_WIDTH / 2.0, 50.0 + NODE_HEIGHT / 2.0));
        assert!(r.contains(Point::new(150.0, 60.0)));
        assert!(!r.contains(Point::new(50.0, 60.0)));
    }
}

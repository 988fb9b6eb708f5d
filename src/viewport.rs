//! Pan/zoom state of the canvas and conversions between screen space
//! (canvas-container-local pixels) and graph space (layout units).

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 1.9;

/// Wheel sensitivity `k` in `factor = exp(-delta_y * k)`.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.0015;

/// Affine pan/zoom: `screen = graph * scale + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Transform {
    /// The transform every view switch resets to.
    pub const DEFAULT: Transform = Transform {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    /// Build a transform, clamping `scale` into `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self {
            x,
            y,
            scale: clamp_scale(scale),
        }
    }

    pub fn pan(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn to_graph_space(&self, screen: Point) -> Point {
        (screen - self.pan()) / self.scale
    }

    pub fn to_screen_space(&self, graph: Point) -> Point {
        graph * self.scale + self.pan()
    }

    /// Translate by a screen-space delta. Scale is unchanged.
    pub fn pan_by(&self, delta: Point) -> Transform {
        Transform {
            x: self.x + delta.x,
            y: self.y + delta.y,
            scale: self.scale,
        }
    }

    /// Rescale by `factor` while keeping the graph point under `anchor` fixed.
    ///
    /// `factor` must be finite and positive; anything else leaves the
    /// transform untouched.
    pub fn zoom_at(&self, anchor: Point, factor: f64) -> Transform {
        if !(factor.is_finite() && factor > 0.0) {
            return *self;
        }
        let graph = self.to_graph_space(anchor);
        let scale = clamp_scale(self.scale * factor);
        let pan = anchor - graph * scale;
        Transform {
            x: pan.x,
            y: pan.y,
            scale,
        }
    }
}

pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return Transform::DEFAULT.scale;
    }
    scale.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Exponential zoom response to a wheel delta (positive delta zooms out).
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    (-delta_y * WHEEL_ZOOM_SENSITIVITY).exp()
}

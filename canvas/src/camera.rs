#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point { x: (self.x + other.x) * 0.5, y: (self.y + other.y) * 0.5 }
    }
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Set zoom to `new_zoom` (clamped to `[min_zoom, max_zoom]`) while keeping
    /// the world point under `pivot` on screen at `pivot`.
    ///
    /// Returns `true` if the camera changed.
    pub fn zoom_at(&mut self, pivot: Point, new_zoom: f64, min_zoom: f64, max_zoom: f64) -> bool {
        if !new_zoom.is_finite() {
            return false;
        }
        let clamped = new_zoom.clamp(min_zoom, max_zoom);
        if (clamped - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        let anchor = self.screen_to_world(pivot);
        self.zoom = clamped;
        self.pan_x = pivot.x - anchor.x * clamped;
        self.pan_y = pivot.y - anchor.y * clamped;
        true
    }

    /// Multiply zoom by `factor` around `pivot`. See [`Camera::zoom_at`].
    pub fn zoom_by(&mut self, pivot: Point, factor: f64, min_zoom: f64, max_zoom: f64) -> bool {
        self.zoom_at(pivot, self.zoom * factor, min_zoom, max_zoom)
    }

    /// Move the pan so that `world` lands on screen at `screen`, keeping zoom.
    pub fn align(&mut self, world: Point, screen: Point) {
        self.pan_x = screen.x - world.x * self.zoom;
        self.pan_y = screen.y - world.y * self.zoom;
    }
}

//! Viewport camera: pan offset and zoom scale.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level shown as "100%".
pub const BASE_ZOOM: f64 = 1.0;

/// Persisted viewport state: zoom scale and camera position (screen-space offset).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f64,
    pub position: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: BASE_ZOOM,
            position: Point::ZERO,
        }
    }
}

/// Maps world coordinates to screen coordinates: `screen = offset + world * zoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_limits(0.1, 10.0)
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: BASE_ZOOM,
            min_zoom,
            max_zoom,
        }
    }

    /// World-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Translate the view by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Scale by `factor` while keeping the world point under `screen_point` fixed.
    /// Returns false if the zoom was already at the limit.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let new_zoom = self.clamp_zoom(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        let anchor = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        // Solve offset + anchor * zoom == screen_point.
        self.offset = screen_point.to_vec2() - anchor.to_vec2() * self.zoom;
        true
    }

    /// Scale by `factor` without moving the offset.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        let new_zoom = self.clamp_zoom(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = new_zoom;
        true
    }

    /// World-space rectangle visible in a viewport of `size` screen pixels.
    pub fn visible_rect(&self, size: Size) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(size.width, size.height));
        Rect::from_points(top_left, bottom_right)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            scale: self.zoom,
            position: self.offset.to_point(),
        }
    }

    /// Restore a persisted viewport, clamping the scale to this camera's limits.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.zoom = if viewport.scale.is_finite() && viewport.scale > 0.0 {
            self.clamp_zoom(viewport.scale)
        } else {
            BASE_ZOOM
        };
        self.offset = viewport.position.to_vec2();
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = BASE_ZOOM;
    }
}

//! Primitive shapes: rectangles, circles, ellipses, triangles and block arrows.

use super::{
    ElementId, ElementKind, ElementStyle, ElementTrait, MIN_ELEMENT_SIZE, clamp_extent,
    point_to_polyline_dist, rect_at,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geometry variant of a primitive shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Ellipse,
    Triangle,
    Arrow,
}

/// A primitive shape described by its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub(crate) id: ElementId,
    pub kind: ShapeKind,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Corner radius (0 = sharp corners). Only meaningful for rectangles.
    #[serde(default)]
    pub corner_radius: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ElementStyle,
}

impl Shape {
    /// Create a new shape of the given kind.
    pub fn new(kind: ShapeKind, position: Point, width: f64, height: f64) -> Self {
        let mut shape = Self {
            id: Uuid::new_v4(),
            kind,
            position,
            width,
            height,
            corner_radius: 0.0,
            rotation: 0.0,
            style: ElementStyle::default(),
        };
        shape.normalize();
        shape
    }

    pub fn rectangle(position: Point, width: f64, height: f64) -> Self {
        Self::new(ShapeKind::Rectangle, position, width, height)
    }

    /// Create a circle from its center and radius.
    pub fn circle(center: Point, radius: f64) -> Self {
        let diameter = radius * 2.0;
        Self::new(
            ShapeKind::Circle,
            Point::new(center.x - radius, center.y - radius),
            diameter,
            diameter,
        )
    }

    /// Create a shape from two corner points.
    pub fn from_corners(kind: ShapeKind, p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        Self::new(
            kind,
            Point::new(min_x, min_y),
            (p2.x - p1.x).abs(),
            (p2.y - p1.y).abs(),
        )
    }

    /// Get the shape's box as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        rect_at(self.position, self.width, self.height)
    }

    /// Radius for circles (half the smaller extent for other kinds).
    pub fn radius(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }

    /// Triangle vertices: apex at top center, base along the bottom edge.
    pub fn triangle_points(&self) -> [Point; 3] {
        let rect = self.as_rect();
        [
            Point::new(rect.center().x, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ]
    }
}

fn triangle_contains(tri: [Point; 3], p: Point) -> bool {
    let sign = |a: Point, b: Point, c: Point| (b - a).cross(c - a);
    let d1 = sign(tri[0], tri[1], p);
    let d2 = sign(tri[1], tri[2], p);
    let d3 = sign(tri[2], tri[0], p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

impl ElementTrait for Shape {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Shape
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self.kind {
            ShapeKind::Circle | ShapeKind::Ellipse => {
                let rect = self.as_rect();
                let center = rect.center();
                let rx = self.width / 2.0 + tolerance;
                let ry = self.height / 2.0 + tolerance;
                let dx = (point.x - center.x) / rx;
                let dy = (point.y - center.y) / ry;
                dx * dx + dy * dy <= 1.0
            }
            ShapeKind::Triangle => {
                let [a, b, c] = self.triangle_points();
                triangle_contains([a, b, c], point)
                    || point_to_polyline_dist(point, &[a, b, c, a]) <= tolerance
            }
            ShapeKind::Rectangle | ShapeKind::Arrow => {
                self.as_rect().inflate(tolerance, tolerance).contains(point)
            }
        }
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn normalize(&mut self) {
        self.width = clamp_extent(self.width);
        self.height = clamp_extent(self.height);
        let max_radius = (self.width.min(self.height) / 2.0).max(0.0);
        self.corner_radius = if self.corner_radius.is_finite() {
            self.corner_radius.clamp(0.0, max_radius)
        } else {
            0.0
        };
        if self.kind == ShapeKind::Circle {
            let diameter = self.width.max(self.height).max(MIN_ELEMENT_SIZE);
            self.width = diameter;
            self.height = diameter;
        }
    }
}

//! Freehand ink strokes.

use super::{ElementId, ElementKind, ElementTrait, SerializableColor, point_to_polyline_dist};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pen sub-mode that produced the stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeTool {
    #[default]
    Draw,
    /// Eraser trail. Only ever shown while erasing; never committed to the store.
    Erase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ElementId,
    #[serde(default)]
    pub tool: StrokeTool,
    pub points: Vec<Point>,
    pub color: SerializableColor,
    pub width: f64,
}

impl Stroke {
    /// Start a stroke at `start`.
    pub fn new(tool: StrokeTool, start: Point, color: SerializableColor, width: f64) -> Self {
        Self::from_points(tool, vec![start], color, width)
    }

    pub fn from_points(
        tool: StrokeTool,
        points: Vec<Point>,
        color: SerializableColor,
        width: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            points,
            color,
            width,
        }
    }

    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn is_brush(&self) -> bool {
        self.tool == StrokeTool::Draw
    }

    /// Shortest distance from `point` to any segment of the stroke.
    pub fn distance_to(&self, point: Point) -> f64 {
        point_to_polyline_dist(point, &self.points)
    }
}

impl ElementTrait for Stroke {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Stroke
    }

    fn bounds(&self) -> Rect {
        let Some((&first, rest)) = self.points.split_first() else {
            return Rect::ZERO;
        };
        let rect = rest
            .iter()
            .fold(Rect::from_points(first, first), |rect, &p| rect.union_pt(p));
        let pad = self.width / 2.0;
        rect.inflate(pad, pad)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.distance_to(point) <= tolerance + self.width / 2.0
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    fn normalize(&mut self) {
        if !self.width.is_finite() || self.width <= 0.0 {
            self.width = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Stroke {
        Stroke::from_points(
            StrokeTool::Draw,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            SerializableColor::black(),
            2.0,
        )
    }

    #[test]
    fn test_distance_to() {
        let stroke = line();
        assert!((stroke.distance_to(Point::new(50.0, 5.0)) - 5.0).abs() < 1e-10);
        assert!((stroke.distance_to(Point::new(50.0, 20.0)) - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_bounds_include_width() {
        let bounds = line().bounds();
        assert!((bounds.y0 + 1.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 101.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_point_stroke() {
        let stroke = Stroke::new(
            StrokeTool::Draw,
            Point::new(5.0, 5.0),
            SerializableColor::black(),
            4.0,
        );
        assert!(stroke.hit_test(Point::new(6.0, 5.0), 0.0));
        assert!(!stroke.bounds().is_zero_area());
    }
}

//! Element definitions for the board.
//!
//! Elements are kept in parallel, kind-specific collections by the store; this
//! module defines each kind plus the owned [`Element`] enum used for commands and
//! persisted records.

mod connector;
mod frame;
mod image;
mod shape;
mod stroke;
mod text;

pub use connector::{Connector, ConnectorEnd, Endpoint};
pub use frame::Frame;
pub use image::{ImageElement, ImageFormat, ImageSource};
pub use shape::{Shape, ShapeKind};
pub use stroke::{Stroke, StrokeTool};
pub use text::{
    FontAttrs, FontStyle, FontWeight, TextAlign, TextElement, TextKind, TextShadow, TextTransform,
};

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Smallest width/height any element is clamped to.
pub const MIN_ELEMENT_SIZE: f64 = 4.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS-style hex color (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Fill and stroke attributes shared by drawable elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ElementStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }

    /// Set the stroke color from a peniko Color.
    pub fn set_stroke(&mut self, color: Color) {
        self.stroke_color = color.into();
    }

    /// Set the fill color from a peniko Color.
    pub fn set_fill(&mut self, color: Option<Color>) {
        self.fill_color = color.map(|c| c.into());
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

/// The collection an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Shape,
    Text,
    Image,
    Frame,
    Connector,
    Stroke,
}

impl ElementKind {
    /// Whether connectors can bind to elements of this kind.
    pub fn is_hostable(self) -> bool {
        matches!(
            self,
            ElementKind::Shape | ElementKind::Text | ElementKind::Image | ElementKind::Frame
        )
    }

    /// Whether the element takes part in the global z-order.
    /// Freehand strokes live on their own ink layer ordered by index.
    pub fn is_layered(self) -> bool {
        self != ElementKind::Stroke
    }
}

/// Common behaviour of all element kinds.
pub trait ElementTrait {
    /// Get the unique identifier.
    fn id(&self) -> ElementId;

    /// Which collection this element belongs to.
    fn kind(&self) -> ElementKind;

    /// Axis-aligned bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) hits this element.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    /// Move the element by a world-space delta.
    fn translate(&mut self, delta: Vec2);

    /// Clamp degenerate geometry after creation or an attribute update.
    fn normalize(&mut self) {}
}

/// Owned element of any kind, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Shape(Shape),
    Text(TextElement),
    Image(ImageElement),
    Frame(Frame),
    Connector(Connector),
    Stroke(Stroke),
}

impl Element {
    /// Borrow the element through the common trait.
    pub fn as_element(&self) -> &dyn ElementTrait {
        match self {
            Element::Shape(e) => e,
            Element::Text(e) => e,
            Element::Image(e) => e,
            Element::Frame(e) => e,
            Element::Connector(e) => e,
            Element::Stroke(e) => e,
        }
    }

    fn as_element_mut(&mut self) -> &mut dyn ElementTrait {
        match self {
            Element::Shape(e) => e,
            Element::Text(e) => e,
            Element::Image(e) => e,
            Element::Frame(e) => e,
            Element::Connector(e) => e,
            Element::Stroke(e) => e,
        }
    }

    pub fn id(&self) -> ElementId {
        self.as_element().id()
    }

    pub fn kind(&self) -> ElementKind {
        self.as_element().kind()
    }

    pub fn bounds(&self) -> Rect {
        self.as_element().bounds()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_element_mut().translate(delta);
    }

    pub fn normalize(&mut self) {
        self.as_element_mut().normalize();
    }

    /// Replace the element's ID with a fresh one.
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            Element::Shape(e) => e.id = new_id,
            Element::Text(e) => e.id = new_id,
            Element::Image(e) => e.id = new_id,
            Element::Frame(e) => e.id = new_id,
            Element::Connector(e) => e.id = new_id,
            Element::Stroke(e) => e.id = new_id,
        }
    }
}

impl From<Shape> for Element {
    fn from(shape: Shape) -> Self {
        Element::Shape(shape)
    }
}

impl From<TextElement> for Element {
    fn from(text: TextElement) -> Self {
        Element::Text(text)
    }
}

impl From<ImageElement> for Element {
    fn from(image: ImageElement) -> Self {
        Element::Image(image)
    }
}

impl From<Frame> for Element {
    fn from(frame: Frame) -> Self {
        Element::Frame(frame)
    }
}

impl From<Connector> for Element {
    fn from(connector: Connector) -> Self {
        Element::Connector(connector)
    }
}

impl From<Stroke> for Element {
    fn from(stroke: Stroke) -> Self {
        Element::Stroke(stroke)
    }
}

/// Clamp an extent to [`MIN_ELEMENT_SIZE`], treating non-finite values as degenerate.
pub(crate) fn clamp_extent(value: f64) -> f64 {
    if value.is_finite() {
        value.max(MIN_ELEMENT_SIZE)
    } else {
        MIN_ELEMENT_SIZE
    }
}

/// Rectangle from a top-left position and size.
pub(crate) fn rect_at(position: Point, width: f64, height: f64) -> Rect {
    Rect::new(
        position.x,
        position.y,
        position.x + width,
        position.y + height,
    )
}

/// Inclusive overlap test between two rectangles (touching edges count).
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
/// A single-point polyline degenerates to the distance to that point.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        assert!((point_to_segment_dist(Point::new(50.0, 5.0), a, b) - 5.0).abs() < 1e-10);
        // Past the end: distance to the endpoint.
        assert!((point_to_segment_dist(Point::new(103.0, 4.0), a, b) - 5.0).abs() < 1e-10);
        // Degenerate segment.
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_polyline_single_point() {
        let d = point_to_polyline_dist(Point::new(3.0, 4.0), &[Point::ZERO]);
        assert!((d - 5.0).abs() < 1e-10);
        assert!(point_to_polyline_dist(Point::ZERO, &[]).is_infinite());
    }

    #[test]
    fn test_rects_intersect_inclusive() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_intersect(a, Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!rects_intersect(a, Rect::new(10.5, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(
            SerializableColor::from_hex("#fff"),
            Some(SerializableColor::white())
        );
        assert_eq!(
            SerializableColor::from_hex("#00000080"),
            Some(SerializableColor::new(0, 0, 0, 128))
        );
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::from_hex("#12"), None);
        assert_eq!(SerializableColor::from_hex("#é1"), None);
        assert_eq!(SerializableColor::from_hex("#+f+f+f"), None);
    }

    #[test]
    fn test_element_tag_roundtrip() {
        let element = Element::from(Shape::rectangle(Point::new(1.0, 2.0), 30.0, 40.0));
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "shape");
        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn test_clamp_extent() {
        assert!((clamp_extent(0.0) - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
        assert!((clamp_extent(f64::NAN) - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
        assert!((clamp_extent(50.0) - 50.0).abs() < f64::EPSILON);
    }
}

//! Stage frames: titled regions used to group content visually.

use super::{ElementId, ElementKind, ElementStyle, ElementTrait, SerializableColor, clamp_extent, rect_at};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub(crate) id: ElementId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub style: ElementStyle,
}

impl Frame {
    pub fn new(position: Point, width: f64, height: f64, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: clamp_extent(width),
            height: clamp_extent(height),
            title: title.into(),
            style: ElementStyle {
                fill_color: Some(SerializableColor::white()),
                stroke_width: 1.0,
                ..ElementStyle::default()
            },
        }
    }

    /// Whether `rect` lies entirely inside the frame.
    pub fn contains_rect(&self, rect: Rect) -> bool {
        let bounds = self.bounds();
        rect.x0 >= bounds.x0 && rect.y0 >= bounds.y0 && rect.x1 <= bounds.x1 && rect.y1 <= bounds.y1
    }
}

impl ElementTrait for Frame {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Frame
    }

    fn bounds(&self) -> Rect {
        rect_at(self.position, self.width, self.height)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn normalize(&mut self) {
        self.width = clamp_extent(self.width);
        self.height = clamp_extent(self.height);
    }
}

//! Rich content elements: free text and sticky notes.

use super::{
    ElementId, ElementKind, ElementTrait, MIN_ELEMENT_SIZE, SerializableColor, clamp_extent,
    rect_at,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Approximate glyph advance as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Default sticky note edge length.
pub const STICKY_NOTE_SIZE: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    #[default]
    Text,
    StickyNote,
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Case transform applied when the text is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn apply(self, content: &str) -> String {
        match self {
            TextTransform::None => content.to_string(),
            TextTransform::Uppercase => content.to_uppercase(),
            TextTransform::Lowercase => content.to_lowercase(),
            TextTransform::Capitalize => {
                let mut out = String::with_capacity(content.len());
                let mut at_word_start = true;
                for c in content.chars() {
                    if at_word_start && c.is_alphabetic() {
                        out.extend(c.to_uppercase());
                    } else {
                        out.push(c);
                    }
                    at_word_start = c.is_whitespace();
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextShadow {
    pub color: SerializableColor,
    pub blur: f64,
    pub offset: Vec2,
}

/// Font attributes of a rich content element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontAttrs {
    pub family: String,
    /// Font size in pixels.
    pub size: f64,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub align: TextAlign,
    /// Extra spacing between glyphs in pixels.
    pub letter_spacing: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    pub transform: TextTransform,
    pub shadow: Option<TextShadow>,
}

impl Default for FontAttrs {
    fn default() -> Self {
        Self {
            family: "Inter".to_string(),
            size: 20.0,
            weight: FontWeight::default(),
            style: FontStyle::default(),
            align: TextAlign::default(),
            letter_spacing: 0.0,
            line_height: 1.2,
            transform: TextTransform::default(),
            shadow: None,
        }
    }
}

/// A text element or sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub(crate) id: ElementId,
    pub kind: TextKind,
    /// Top-left corner of the text box.
    pub position: Point,
    pub content: String,
    #[serde(default)]
    pub font: FontAttrs,
    /// Fixed box width (always set for sticky notes; None = size to content).
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub background: Option<SerializableColor>,
    #[serde(default = "SerializableColor::black")]
    pub text_color: SerializableColor,
    #[serde(default)]
    pub rotation: f64,
}

impl TextElement {
    /// Create a free text element sized to its content.
    pub fn text(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TextKind::Text,
            position,
            content: content.into(),
            font: FontAttrs::default(),
            width: None,
            height: None,
            background: None,
            text_color: SerializableColor::black(),
            rotation: 0.0,
        }
    }

    /// Create a square sticky note with a yellow background.
    pub fn sticky_note(position: Point, content: impl Into<String>) -> Self {
        Self {
            kind: TextKind::StickyNote,
            width: Some(STICKY_NOTE_SIZE),
            height: Some(STICKY_NOTE_SIZE),
            background: Some(SerializableColor::new(255, 235, 120, 255)),
            ..Self::text(position, content)
        }
    }

    /// Content as displayed, after the case transform.
    pub fn display_content(&self) -> String {
        self.font.transform.apply(&self.content)
    }

    /// Approximate content extent from glyph metrics.
    pub fn estimated_size(&self) -> (f64, f64) {
        let content = self.display_content();
        let lines = content.lines().count().max(1);
        let longest = content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        let advance = self.font.size * CHAR_WIDTH_FACTOR + self.font.letter_spacing;
        let width = longest as f64 * advance;
        let height = lines as f64 * self.font.size * self.font.line_height;
        (width.max(MIN_ELEMENT_SIZE), height.max(MIN_ELEMENT_SIZE))
    }
}

impl ElementTrait for TextElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Text
    }

    fn bounds(&self) -> Rect {
        let (est_w, est_h) = self.estimated_size();
        rect_at(
            self.position,
            self.width.unwrap_or(est_w),
            self.height.unwrap_or(est_h),
        )
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn normalize(&mut self) {
        self.width = self.width.map(clamp_extent);
        self.height = self.height.map(clamp_extent);
        if !self.font.size.is_finite() || self.font.size < 1.0 {
            self.font.size = 1.0;
        }
        if !self.font.line_height.is_finite() || self.font.line_height <= 0.0 {
            self.font.line_height = 1.0;
        }
        if self.kind == TextKind::StickyNote {
            self.width.get_or_insert(STICKY_NOTE_SIZE);
            self.height.get_or_insert(STICKY_NOTE_SIZE);
        }
    }
}

//! Raster image elements, referenced by URL or embedded as base64.

use super::{ElementId, ElementKind, ElementTrait, clamp_extent, rect_at};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Encoding of embedded image bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Guess the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Sniff the format from the leading bytes of the payload.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'G', b'I', b'F', b'8', ..] => Some(ImageFormat::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageFormat::WebP)
            }
            _ => None,
        }
    }
}

/// Where the pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    Url { url: String },
    Embedded { format: ImageFormat, data_base64: String },
}

/// An image placed on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub(crate) id: ElementId,
    /// Top-left corner position.
    pub position: Point,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
    pub source: ImageSource,
    /// Original pixel width.
    pub natural_width: f64,
    /// Original pixel height.
    pub natural_height: f64,
    /// Width / height, preserved across proportional resizes.
    pub aspect_ratio: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl ImageElement {
    /// Create an image referencing a remote URL, rendered at its natural size.
    pub fn from_url(
        position: Point,
        url: impl Into<String>,
        natural_width: f64,
        natural_height: f64,
    ) -> Self {
        let mut image = Self {
            id: Uuid::new_v4(),
            position,
            width: natural_width,
            height: natural_height,
            source: ImageSource::Url { url: url.into() },
            natural_width,
            natural_height,
            aspect_ratio: 1.0,
            rotation: 0.0,
        };
        image.normalize();
        image
    }

    /// Embed raw image bytes. Returns None when the format cannot be recognized.
    pub fn from_bytes(
        position: Point,
        data: &[u8],
        natural_width: f64,
        natural_height: f64,
    ) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(data)?;
        let mut image = Self::from_url(position, String::new(), natural_width, natural_height);
        image.source = ImageSource::Embedded {
            format,
            data_base64: STANDARD.encode(data),
        };
        Some(image)
    }

    /// Scale down (or up) to fit inside the given box, keeping the aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        if max_width / max_height < self.aspect_ratio {
            self.width = max_width;
            self.height = max_width / self.aspect_ratio;
        } else {
            self.height = max_height;
            self.width = max_height * self.aspect_ratio;
        }
        self.normalize();
        self
    }

    /// Set the width and derive the height from the stored aspect ratio.
    pub fn resize_proportional(&mut self, width: f64) {
        self.width = clamp_extent(width);
        self.height = clamp_extent(self.width / self.aspect_ratio);
    }

    /// Decoded bytes of an embedded image.
    pub fn data(&self) -> Option<Vec<u8>> {
        match &self.source {
            ImageSource::Embedded { data_base64, .. } => STANDARD.decode(data_base64).ok(),
            ImageSource::Url { .. } => None,
        }
    }
}

impl ElementTrait for ImageElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Image
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
        let natural_ok = self.natural_width.is_finite()
            && self.natural_height.is_finite()
            && self.natural_width > 0.0
            && self.natural_height > 0.0;
        if natural_ok {
            self.aspect_ratio = self.natural_width / self.natural_height;
        } else if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            self.aspect_ratio = self.width / self.height;
        }
    }
}

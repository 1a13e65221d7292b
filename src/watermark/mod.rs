//! Watermark rasterization
//!
//! Turns a [`WatermarkSpec`] into a single RGBA [`WatermarkRaster`] sized for a
//! document's [`BoundingBox`]. The raster is produced once per document and
//! shared by every page.
//!
//! - Text watermarks always fill the whole bounding box, with the text centered
//!   inside a transparent canvas.
//! - Image watermarks keep the source's (downscaled) size, grown by the shadow
//!   offset when a shadow is requested.

pub mod bitmap_font;
pub mod composite;
pub mod font;
pub mod picture;
pub mod text;

use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, RgbaImage};

use crate::color::ColorRgb;
use crate::error::{Error, Result};
use crate::layout::BoundingBox;

pub use font::FontRef;

/// Default shadow offset in pixels
pub const DEFAULT_SHADOW_OFFSET: u32 = 5;

/// Opacity in the range [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opacity(f32);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);

    /// Validate an opacity value; `name` identifies the setting in errors
    pub fn new(name: &'static str, value: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidOpacity { name, value });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Alpha byte for this opacity, truncated like `int(255 * opacity)`
    pub fn alpha(&self) -> u8 {
        (255.0 * self.0) as u8
    }
}

/// Drop shadow settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub opacity: Opacity,
    /// Offset to the lower right, in pixels
    pub offset: u32,
}

/// Text watermark settings
#[derive(Debug, Clone, PartialEq)]
pub struct TextWatermark {
    pub content: String,
    pub font: FontRef,
    /// Font size in pixels (points, at one pixel per point)
    pub font_size: u32,
    pub color: ColorRgb,
    pub opacity: Opacity,
    pub shadow: Option<Shadow>,
}

/// Image watermark settings
#[derive(Debug, Clone, PartialEq)]
pub struct ImageWatermark {
    pub source: PathBuf,
    pub opacity: Opacity,
    pub shadow: Option<Shadow>,
}

/// The watermark to stamp: exactly one of text or image
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkSpec {
    Text(TextWatermark),
    Image(ImageWatermark),
}

impl WatermarkSpec {
    pub fn shadow(&self) -> Option<&Shadow> {
        match self {
            WatermarkSpec::Text(t) => t.shadow.as_ref(),
            WatermarkSpec::Image(i) => i.shadow.as_ref(),
        }
    }
}

/// The rendered watermark layer
#[derive(Debug, Clone)]
pub struct WatermarkRaster {
    image: RgbaImage,
}

impl WatermarkRaster {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Encode the raster as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Render a watermark for the given bounding box
pub fn render(spec: &WatermarkSpec, bounds: BoundingBox) -> Result<WatermarkRaster> {
    match spec {
        WatermarkSpec::Text(text_spec) => text::render_text_watermark(text_spec, bounds),
        WatermarkSpec::Image(image_spec) => {
            let source = picture::load_source(&image_spec.source)?;
            Ok(picture::render_image_watermark(source, image_spec, bounds))
        }
    }
}

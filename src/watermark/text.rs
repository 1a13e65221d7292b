//! Text watermark rendering

use image::{GrayImage, RgbaImage};
use log::{debug, warn};

use super::bitmap_font;
use super::composite::draw_coverage;
use super::font::{resolve_font, ResolvedFont};
use super::{TextWatermark, WatermarkRaster};
use crate::color::ColorRgb;
use crate::error::Result;
use crate::layout::BoundingBox;

/// Tight box of the inked pixels in a coverage mask: (x, y, width, height)
pub fn ink_bounds(mask: &GrayImage) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut inked = false;

    for (x, y, value) in mask.enumerate_pixels() {
        if value[0] == 0 {
            continue;
        }
        inked = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    inked.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Render a text watermark onto a transparent canvas the size of `bounds`
pub fn render_text_watermark(spec: &TextWatermark, bounds: BoundingBox) -> Result<WatermarkRaster> {
    let font = resolve_font(&spec.font, spec.font_size)?;
    if !font.honors_size() {
        warn!(
            "No outline font available; using the built-in {}px bitmap font (requested size {} is ignored)",
            bitmap_font::FIXED_SIZE,
            spec.font_size
        );
    }
    Ok(render_with_font(spec, &font, bounds))
}

/// Render with an already resolved font
pub fn render_with_font(spec: &TextWatermark, font: &ResolvedFont, bounds: BoundingBox) -> WatermarkRaster {
    let (width, height) = bounds.pixel_size();
    let mut canvas = RgbaImage::new(width, height);

    let mask = font.rasterize(&spec.content);
    let Some((ink_x, ink_y, text_w, text_h)) = ink_bounds(&mask) else {
        debug!("Watermark text has no visible glyphs");
        return WatermarkRaster::new(canvas);
    };

    // Centering offsets may be negative when the text is wider than the box
    let x = ((width as f64 - text_w as f64) / 2.0).floor() as i64;
    let y = ((height as f64 - text_h as f64) / 2.0).floor() as i64;

    // Mask origin so the inked box lands at (x, y)
    let origin_x = x - ink_x as i64;
    let origin_y = y - ink_y as i64;

    debug!(
        "Text watermark {}x{} centered at ({}, {}) in {}x{} canvas",
        text_w, text_h, x, y, width, height
    );

    if let Some(shadow) = spec.shadow {
        let offset = shadow.offset as i64;
        draw_coverage(
            &mut canvas,
            &mask,
            origin_x + offset,
            origin_y + offset,
            ColorRgb::black(),
            shadow.opacity.alpha(),
        );
    }

    draw_coverage(&mut canvas, &mask, origin_x, origin_y, spec.color, spec.opacity.alpha());

    WatermarkRaster::new(canvas)
}

//! Pixel-level compositing helpers shared by the text and image renderers

use image::{GrayImage, RgbaImage};

use crate::color::ColorRgb;

/// Multiply every pixel's alpha by `factor`, keeping existing transparency
pub fn scale_alpha(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * factor) as u8;
    }
}

/// Paste `overlay` onto `base` at (`x`, `y`) using the overlay's own alpha as mask
///
/// Every channel, alpha included, is interpolated between base and overlay by
/// the mask value. Pixels falling outside `base` are dropped.
pub fn paste_with_alpha_mask(base: &mut RgbaImage, overlay: &RgbaImage, x: u32, y: u32) {
    for (ox, oy, src) in overlay.enumerate_pixels() {
        let (tx, ty) = (x + ox, y + oy);
        if tx >= base.width() || ty >= base.height() {
            continue;
        }

        let mask = src[3] as u32;
        let dst = base.get_pixel_mut(tx, ty);
        for channel in 0..4 {
            let mixed = (src[channel] as u32 * mask + dst[channel] as u32 * (255 - mask) + 127) / 255;
            dst[channel] = mixed as u8;
        }
    }
}

/// Fill a coverage mask onto `canvas` with a solid ink
///
/// Each channel moves from the existing pixel towards `(color, alpha)` by the
/// coverage value, so fully covered pixels end up exactly at the ink value
/// whatever was drawn before. The top-left of the mask lands at (`x`, `y`),
/// which may lie outside the canvas.
pub fn draw_coverage(
    canvas: &mut RgbaImage,
    coverage: &GrayImage,
    x: i64,
    y: i64,
    color: ColorRgb,
    alpha: u8,
) {
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);

    for (cx, cy, value) in coverage.enumerate_pixels() {
        if value[0] == 0 {
            continue;
        }

        let (tx, ty) = (x + cx as i64, y + cy as i64);
        if tx < 0 || ty < 0 || tx >= width || ty >= height {
            continue;
        }

        let ink = [color.r, color.g, color.b, alpha];
        let mask = value[0] as u32;
        let dst = canvas.get_pixel_mut(tx as u32, ty as u32);
        for channel in 0..4 {
            let mixed = (ink[channel] as u32 * mask + dst[channel] as u32 * (255 - mask) + 127) / 255;
            dst[channel] = mixed as u8;
        }
    }
}

//! Image watermark rendering

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use log::debug;

use super::composite::{paste_with_alpha_mask, scale_alpha};
use super::{ImageWatermark, WatermarkRaster};
use crate::error::{Error, Result};
use crate::layout::BoundingBox;

/// Open and decode a watermark image
pub fn load_source(path: &Path) -> Result<DynamicImage> {
    if !path.is_file() {
        return Err(Error::SourceDocument {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    image::open(path).map_err(|e| Error::SourceDocument {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Largest size fitting in `max_width` × `max_height` with the source aspect ratio
///
/// Never upscales. When rounding, picks whichever whole-pixel size keeps the
/// aspect ratio closest to the source; both sides stay at least one pixel.
pub fn fit_within(width: u32, height: u32, max_width: f32, max_height: f32) -> (u32, u32) {
    let max_w = max_width.max(0.0).floor() as u32;
    let max_h = max_height.max(0.0).floor() as u32;

    if width == 0 || height == 0 || (max_w >= width && max_h >= height) {
        return (width, height);
    }

    let (max_w, max_h) = (max_w.max(1) as f64, max_h.max(1) as f64);
    let aspect = width as f64 / height as f64;

    // choose between floor and ceil by aspect error
    let closest = |value: f64, error: &dyn Fn(f64) -> f64| -> u32 {
        let (lo, hi) = (value.floor(), value.ceil());
        let best = if error(hi) < error(lo) { hi } else { lo };
        (best as u32).max(1)
    };

    if max_w / max_h >= aspect {
        let w = closest(max_h * aspect, &|n| (aspect - n / max_h).abs());
        (w, max_h as u32)
    } else {
        let h = closest(max_w / aspect, &|n| if n == 0.0 { 0.0 } else { (aspect - max_w / n).abs() });
        (max_w as u32, h)
    }
}

/// Render an image watermark from a decoded source image
///
/// The raster keeps the source's own (possibly downscaled) size; a shadow
/// grows it by the shadow offset on both axes.
pub fn render_image_watermark(
    source: DynamicImage,
    spec: &ImageWatermark,
    bounds: BoundingBox,
) -> WatermarkRaster {
    let mut working = source.to_rgba8();

    let (fit_w, fit_h) = fit_within(working.width(), working.height(), bounds.width, bounds.height);
    if (fit_w, fit_h) != working.dimensions() {
        debug!(
            "Scaling watermark image from {}x{} to {}x{}",
            working.width(),
            working.height(),
            fit_w,
            fit_h
        );
        working = imageops::resize(&working, fit_w, fit_h, FilterType::CatmullRom);
    }

    if spec.opacity.value() < 1.0 {
        scale_alpha(&mut working, spec.opacity.value());
    }

    let Some(shadow) = spec.shadow else {
        return WatermarkRaster::new(working);
    };

    let mut canvas = RgbaImage::from_pixel(
        working.width() + shadow.offset,
        working.height() + shadow.offset,
        Rgba([0, 0, 0, shadow.opacity.alpha()]),
    );
    paste_with_alpha_mask(&mut canvas, &working, shadow.offset, shadow.offset);

    WatermarkRaster::new(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::{Opacity, Shadow, DEFAULT_SHADOW_OFFSET};
    use std::path::PathBuf;

    fn spec(opacity: f32, shadow: Option<Shadow>) -> ImageWatermark {
        ImageWatermark {
            source: PathBuf::from("logo.png"),
            opacity: Opacity::new("image opacity", opacity).unwrap(),
            shadow,
        }
    }

    fn default_shadow() -> Shadow {
        Shadow {
            opacity: Opacity::new("shadow opacity", 0.3).unwrap(),
            offset: DEFAULT_SHADOW_OFFSET,
        }
    }

    fn solid(width: u32, height: u32, alpha: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 50, 25, alpha])))
    }

    #[test]
    fn test_fit_within_no_upscale() {
        assert_eq!(fit_within(100, 50, 540.0, 720.0), (100, 50));
        assert_eq!(fit_within(540, 720, 540.9, 720.2), (540, 720));
    }

    #[test]
    fn test_fit_within_downscales_preserving_aspect() {
        let (w, h) = fit_within(2000, 1000, 540.0, 720.0);
        assert_eq!((w, h), (540, 270));

        let (w, h) = fit_within(1000, 3000, 540.0, 720.0);
        assert_eq!(h, 720);
        assert!((w as f64 - 240.0).abs() <= 1.0);

        // aspect preserved to within one pixel
        let (w, h) = fit_within(1234, 987, 300.0, 300.0);
        assert!(w <= 300 && h <= 300);
        let expected_h = w as f64 * 987.0 / 1234.0;
        assert!((h as f64 - expected_h).abs() <= 1.0);
    }

    #[test]
    fn test_fit_within_one_axis_too_large() {
        let (w, h) = fit_within(100, 1000, 540.0, 500.0);
        assert_eq!((w, h), (50, 500));
    }

    #[test]
    fn test_fit_within_extreme_aspect_keeps_one_pixel() {
        let (w, h) = fit_within(10_000, 2, 100.0, 100.0);
        assert_eq!((w, h), (100, 1));
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let raster = render_image_watermark(solid(40, 30, 255), &spec(1.0, None), BoundingBox::new(540.0, 720.0));
        assert_eq!((raster.width(), raster.height()), (40, 30));
    }

    #[test]
    fn test_large_image_downscaled() {
        let raster = render_image_watermark(solid(1200, 600, 255), &spec(1.0, None), BoundingBox::new(360.0, 540.0));
        assert_eq!((raster.width(), raster.height()), (360, 180));
    }

    #[test]
    fn test_shadow_grows_raster_by_offset() {
        let bounds = BoundingBox::new(360.0, 540.0);
        let plain = render_image_watermark(solid(1200, 600, 255), &spec(0.3, None), bounds);
        let shadowed = render_image_watermark(solid(1200, 600, 255), &spec(0.3, Some(default_shadow())), bounds);

        assert_eq!(shadowed.width(), plain.width() + DEFAULT_SHADOW_OFFSET);
        assert_eq!(shadowed.height(), plain.height() + DEFAULT_SHADOW_OFFSET);
    }

    #[test]
    fn test_opacity_scales_existing_alpha() {
        let mut source = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 200]));
        source.put_pixel(0, 0, Rgba([10, 20, 30, 0]));

        let raster = render_image_watermark(
            DynamicImage::ImageRgba8(source),
            &spec(0.5, None),
            BoundingBox::new(100.0, 100.0),
        );

        assert_eq!(raster.image().get_pixel(0, 0)[3], 0);
        assert_eq!(raster.image().get_pixel(1, 1)[3], 100);
    }

    #[test]
    fn test_rgb_source_becomes_opaque_rgba() {
        let source = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(3, 3, image::Rgb([1, 2, 3])));
        let raster = render_image_watermark(source, &spec(1.0, None), BoundingBox::new(100.0, 100.0));
        assert_eq!(*raster.image().get_pixel(1, 1), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_shadow_canvas_composition() {
        let raster = render_image_watermark(solid(10, 10, 255), &spec(1.0, Some(default_shadow())), BoundingBox::new(100.0, 100.0));

        // shadow strip along the top-left edge
        assert_eq!(*raster.image().get_pixel(0, 0), Rgba([0, 0, 0, 76]));
        // opaque image pasted at the offset
        assert_eq!(*raster.image().get_pixel(5, 5), Rgba([200, 50, 25, 255]));
        assert_eq!(*raster.image().get_pixel(14, 14), Rgba([200, 50, 25, 255]));
    }

    #[test]
    fn test_load_missing_source() {
        let result = load_source(Path::new("missing-watermark.png"));
        assert!(matches!(result, Err(Error::SourceDocument { .. })));
    }

    #[test]
    fn test_load_undecodable_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"not a png").unwrap();

        let result = load_source(&path);
        assert!(matches!(result, Err(Error::SourceDocument { .. })));
    }
}

//! Page geometry and watermark placement calculations
//!
//! All coordinates here are in page space: points (1/72 inch), origin at the
//! top-left corner of the visible page, y growing downwards. The PDF backend
//! maps these into PDF user space.

/// Fraction of the smallest page that the watermark may occupy
pub const WATERMARK_FILL: f32 = 0.9;

/// Size of a single page in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }
}

/// Axis-aligned rectangle in page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// Maximum watermark footprint for a whole document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Derive the bounding box from every page of a document
    ///
    /// Uses the minimum width and the minimum height independently, so one
    /// raster fits on every page. Returns `None` for a document without pages.
    pub fn from_pages(pages: &[PageSize]) -> Option<Self> {
        let min_width = pages.iter().map(|p| p.width).reduce(f32::min)?;
        let min_height = pages.iter().map(|p| p.height).reduce(f32::min)?;

        Some(Self::new(min_width * WATERMARK_FILL, min_height * WATERMARK_FILL))
    }

    /// Whole-pixel canvas size, truncating fractional points
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width.max(0.0) as u32).max(1),
            (self.height.max(0.0) as u32).max(1),
        )
    }
}

/// Rectangle that centers a `width` × `height` raster on `page`
///
/// The result may start at a negative offset when the raster is larger than
/// the page; nothing is clipped here.
pub fn centered_rect(page: &PageSize, width: u32, height: u32) -> Rect {
    let (w, h) = (width as f32, height as f32);
    let x = (page.width - w) / 2.0;
    let y = (page.height - h) / 2.0;

    Rect { x0: x, y0: y, x1: x + w, y1: y + h }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_uses_smallest_dimensions() {
        let pages = [PageSize::new(600.0, 500.0), PageSize::new(400.0, 800.0)];
        let bounds = BoundingBox::from_pages(&pages).unwrap();

        // width from the second page, height from the first
        assert!((bounds.width - 360.0).abs() < 0.01);
        assert!((bounds.height - 450.0).abs() < 0.01);
    }

    #[test]
    fn test_bounding_box_empty_document() {
        assert_eq!(BoundingBox::from_pages(&[]), None);
    }

    #[test]
    fn test_pixel_size_truncates() {
        let bounds = BoundingBox::new(535.5, 757.8);
        assert_eq!(bounds.pixel_size(), (535, 757));

        let tiny = BoundingBox::new(0.4, 0.0);
        assert_eq!(tiny.pixel_size(), (1, 1));
    }

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(&PageSize::new(600.0, 800.0), 200, 100);
        assert_eq!(rect, Rect { x0: 200.0, y0: 350.0, x1: 400.0, y1: 450.0 });
        assert_eq!(rect.width(), 200.0);
        assert_eq!(rect.height(), 100.0);
    }

    #[test]
    fn test_centered_rect_larger_than_page() {
        let rect = centered_rect(&PageSize::new(100.0, 100.0), 120, 100);
        assert_eq!(rect.x0, -10.0);
        assert_eq!(rect.y0, 0.0);
    }

    #[test]
    fn test_standard_sizes() {
        let letter = PageSize::letter();
        assert_eq!((letter.width, letter.height), (612.0, 792.0));

        let a4 = PageSize::a4();
        assert_eq!((a4.width, a4.height), (595.0, 842.0));
    }
}

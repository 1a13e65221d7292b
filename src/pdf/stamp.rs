//! Stamping a rendered watermark onto every page

use log::{debug, info};

use super::DocumentBackend;
use crate::error::Result;
use crate::layout::centered_rect;
use crate::watermark::WatermarkRaster;

/// Center `raster` on every page of `doc`
///
/// The raster is encoded once and the same bytes go to every page. Each page
/// is centered using its own size, so on pages larger than the smallest one
/// the watermark covers less than the full 90% footprint.
pub fn stamp_pages<D: DocumentBackend + ?Sized>(doc: &mut D, raster: &WatermarkRaster) -> Result<()> {
    let pages = doc.page_sizes();
    if pages.is_empty() {
        return Ok(());
    }

    let png = raster.encode_png()?;
    info!(
        "Stamping {}x{} watermark onto {} page(s)",
        raster.width(),
        raster.height(),
        pages.len()
    );

    for (index, page) in pages.iter().enumerate() {
        let rect = centered_rect(page, raster.width(), raster.height());
        debug!(
            "Page {}: {}x{} -> watermark at [{}, {}, {}, {}]",
            index + 1,
            page.width,
            page.height,
            rect.x0,
            rect.y0,
            rect.x1,
            rect.y1
        );
        doc.insert_image(index, rect, &png)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageSize, Rect};
    use crate::pdf::MetadataKey;
    use image::RgbaImage;
    use std::path::Path;

    /// Records every insertion instead of touching a PDF
    struct RecordingBackend {
        pages: Vec<PageSize>,
        inserted: Vec<(usize, Rect, Vec<u8>)>,
    }

    impl RecordingBackend {
        fn new(pages: Vec<PageSize>) -> Self {
            Self { pages, inserted: Vec::new() }
        }
    }

    impl DocumentBackend for RecordingBackend {
        fn page_sizes(&self) -> Vec<PageSize> {
            self.pages.clone()
        }

        fn insert_image(&mut self, page_index: usize, rect: Rect, png: &[u8]) -> Result<()> {
            self.inserted.push((page_index, rect, png.to_vec()));
            Ok(())
        }

        fn metadata(&self, _: MetadataKey) -> Option<String> {
            None
        }

        fn set_metadata(&mut self, _: MetadataKey, _: &str) -> Result<()> {
            Ok(())
        }

        fn save(&mut self, _: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_each_page_centered_on_its_own_size() {
        let mut doc = RecordingBackend::new(vec![PageSize::new(600.0, 800.0), PageSize::new(400.0, 600.0)]);
        let raster = WatermarkRaster::new(RgbaImage::new(360, 540));

        stamp_pages(&mut doc, &raster).unwrap();

        assert_eq!(doc.inserted.len(), 2);
        assert_eq!(doc.inserted[0].0, 0);
        assert_eq!(doc.inserted[0].1, Rect { x0: 120.0, y0: 130.0, x1: 480.0, y1: 670.0 });
        assert_eq!(doc.inserted[1].0, 1);
        assert_eq!(doc.inserted[1].1, Rect { x0: 20.0, y0: 30.0, x1: 380.0, y1: 570.0 });
    }

    #[test]
    fn test_same_bytes_for_every_page() {
        let mut doc = RecordingBackend::new(vec![PageSize::letter(); 3]);
        let raster = WatermarkRaster::new(RgbaImage::new(10, 10));

        stamp_pages(&mut doc, &raster).unwrap();

        assert_eq!(doc.inserted.len(), 3);
        assert!(doc.inserted.iter().all(|(_, _, png)| png == &doc.inserted[0].2));
        assert_eq!(&doc.inserted[0].2[1..4], b"PNG");
    }

    #[test]
    fn test_zero_pages_is_noop() {
        let mut doc = RecordingBackend::new(Vec::new());
        let raster = WatermarkRaster::new(RgbaImage::new(10, 10));

        stamp_pages(&mut doc, &raster).unwrap();
        assert!(doc.inserted.is_empty());
    }
}

//! End-to-end watermarking of one document

use std::path::Path;

use log::{debug, info, warn};

use crate::config::{InputSource, WatermarkJob};
use crate::error::Result;
use crate::layout::BoundingBox;
use crate::markdown::render_markdown_file;
use crate::pdf::{merge_metadata, stamp_pages, DocumentBackend, MetadataRecord, PdfDocument};
use crate::watermark::{self, WatermarkSpec};

/// Watermark every page of an open document and merge metadata overrides
///
/// A document without pages is left unstamped, but still gets its metadata.
pub fn watermark_document<D: DocumentBackend + ?Sized>(
    doc: &mut D,
    spec: &WatermarkSpec,
    metadata: &MetadataRecord,
) -> Result<()> {
    let pages = doc.page_sizes();

    match BoundingBox::from_pages(&pages) {
        Some(bounds) => {
            info!("Rendering watermark within {:.1} x {:.1} pt", bounds.width, bounds.height);
            if let Some(shadow) = spec.shadow() {
                debug!("Drop shadow offset {} px at opacity {:.2}", shadow.offset, shadow.opacity.value());
            }
            let raster = watermark::render(spec, bounds)?;
            stamp_pages(doc, &raster)?;
        }
        None => warn!("Document has no pages, nothing to watermark"),
    }

    merge_metadata(doc, metadata)
}

/// Run a validated job: open or render the input, watermark it and save
///
/// A Markdown input is rendered to a temporary PDF that is removed when this
/// function returns, whether or not it succeeds.
pub fn run(job: &WatermarkJob) -> Result<()> {
    match &job.input {
        InputSource::Pdf(path) => watermark_file(path, job),
        InputSource::Markdown(markdown) => {
            let transient = tempfile::Builder::new()
                .prefix("pdf-watermark-")
                .suffix(".pdf")
                .tempfile()?;

            render_markdown_file(markdown, transient.path())?;
            watermark_file(transient.path(), job)
        }
    }
}

fn watermark_file(input: &Path, job: &WatermarkJob) -> Result<()> {
    info!("Opening {}", input.display());
    let mut doc = PdfDocument::open(input)?;

    watermark_document(&mut doc, &job.watermark, &job.metadata)?;

    info!("Saving {}", job.output.display());
    doc.save(&job.output)
}

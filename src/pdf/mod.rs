//! PDF document handling
//!
//! The watermark pipeline talks to documents only through [`DocumentBackend`],
//! so stamping and metadata merging can be exercised without real PDF bytes.

pub mod document;
pub mod metadata;
pub mod stamp;

use std::path::Path;

use crate::error::Result;
use crate::layout::{PageSize, Rect};

// Re-export commonly used items
pub use document::PdfDocument;
pub use metadata::{merge_metadata, MetadataKey, MetadataRecord};
pub use stamp::stamp_pages;

/// Narrow interface over a mutable, in-memory PDF document
pub trait DocumentBackend {
    /// Visible size of every page, in document order
    fn page_sizes(&self) -> Vec<PageSize>;

    /// Draw an encoded PNG over the existing content of a page
    ///
    /// `rect` is in page space: top-left origin, y pointing down.
    fn insert_image(&mut self, page_index: usize, rect: Rect, png: &[u8]) -> Result<()>;

    /// Current value of a metadata field
    fn metadata(&self, key: MetadataKey) -> Option<String>;

    /// Replace a metadata field
    fn set_metadata(&mut self, key: MetadataKey, value: &str) -> Result<()>;

    /// Persist the document to `path`
    fn save(&mut self, path: &Path) -> Result<()>;
}

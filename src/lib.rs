//! PDF Watermark Library
//!
//! Stamps a text or image watermark onto every page of a PDF and rewrites its
//! metadata. This library provides functionality to:
//! - Parse hex colors for text watermarks
//! - Rasterize text (with font fallback) or scale an image into one watermark layer
//! - Center that layer on every page, whatever the page sizes
//! - Merge metadata overrides (title, author, ...)
//! - Render simple Markdown into a PDF to watermark
//!
//! # Example
//!
//! ```no_run
//! use pdf_watermark::config::WatermarkOptions;
//! use pdf_watermark::pipeline::run;
//! use std::path::PathBuf;
//!
//! let options = WatermarkOptions {
//!     input_pdf: Some(PathBuf::from("report.pdf")),
//!     output: PathBuf::from("report-draft.pdf"),
//!     watermark_text: Some("DRAFT".to_string()),
//!     ..Default::default()
//! };
//!
//! let job = options.into_job().expect("Invalid options");
//! run(&job).expect("Failed to watermark PDF");
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod layout;
pub mod markdown;
pub mod pdf;
pub mod pipeline;
pub mod watermark;

// Re-export commonly used items
pub use config::{InputSource, WatermarkJob, WatermarkOptions};
pub use error::{Error, Result};
pub use pipeline::{run, watermark_document};

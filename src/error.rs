//! Error types for the PDF watermark library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF watermark library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed hex color string
    #[error("Invalid color '{0}': expected 6 hex digits such as #RRGGBB")]
    InvalidColorFormat(String),

    /// Explicit font path does not exist
    #[error("Font file not found: {}", .0.display())]
    FontNotFound(PathBuf),

    /// Font file exists but could not be parsed
    #[error("Invalid font {}: {reason}", .path.display())]
    InvalidFont { path: PathBuf, reason: String },

    /// Neither an image nor a text watermark was selected
    #[error("No watermark source given: use either an image or a text watermark")]
    MissingWatermarkSource,

    /// Both an image and a text watermark were selected
    #[error("Conflicting watermark sources: choose an image or a text watermark, not both")]
    ConflictingWatermarkSource,

    /// Neither a PDF nor a Markdown input was selected
    #[error("No input document given: use either a PDF or a Markdown file")]
    MissingInputDocument,

    /// Both a PDF and a Markdown input were selected
    #[error("Conflicting input documents: choose a PDF or a Markdown file, not both")]
    ConflictingInputDocument,

    /// Opacity outside of [0.0, 1.0]
    #[error("Invalid {name} {value}: must be between 0.0 and 1.0")]
    InvalidOpacity { name: &'static str, value: f32 },

    /// Input PDF or watermark image could not be opened or decoded
    #[error("Cannot read {}: {reason}", .path.display())]
    SourceDocument { path: PathBuf, reason: String },

    /// Output document could not be written
    #[error("Cannot write {}: {reason}", .path.display())]
    BackendIo { path: PathBuf, reason: String },

    /// General error
    #[error("{0}")]
    General(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_input() {
        let err = Error::InvalidColorFormat("#12345".to_string());
        assert!(err.to_string().contains("#12345"));

        let err = Error::FontNotFound(PathBuf::from("fonts/missing.ttf"));
        assert_eq!(err.to_string(), "Font file not found: fonts/missing.ttf");

        let err = Error::InvalidOpacity { name: "text opacity", value: 1.5 };
        assert_eq!(err.to_string(), "Invalid text opacity 1.5: must be between 0.0 and 1.0");
    }
}

//! Job configuration
//!
//! [`WatermarkOptions`] holds raw, loosely typed settings as they arrive from
//! the command line. [`WatermarkOptions::into_job`] validates them in one pass
//! into a [`WatermarkJob`], where the mutually exclusive choices have become
//! sum types.

use std::path::PathBuf;

use crate::color::parse_hex_color;
use crate::error::{Error, Result};
use crate::pdf::MetadataRecord;
use crate::watermark::{
    FontRef, ImageWatermark, Opacity, Shadow, TextWatermark, WatermarkSpec, DEFAULT_SHADOW_OFFSET,
};

/// Raw watermarking settings
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkOptions {
    pub input_pdf: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
    pub output: PathBuf,
    pub watermark_image: Option<PathBuf>,
    pub watermark_text: Option<String>,
    pub font_path: Option<PathBuf>,
    /// Font size in points
    pub font_size: u32,
    /// Hex color such as `#RRGGBB`
    pub text_color: String,
    pub text_opacity: f32,
    pub image_opacity: f32,
    pub shadow: bool,
    pub shadow_opacity: f32,
    /// Shadow offset in pixels
    pub shadow_offset: u32,
    pub metadata: MetadataRecord,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            input_pdf: None,
            markdown: None,
            output: PathBuf::from("output.pdf"),
            watermark_image: None,
            watermark_text: None,
            font_path: None,
            font_size: 36,
            text_color: "#000000".to_string(),
            text_opacity: 0.3,
            image_opacity: 0.3,
            shadow: false,
            shadow_opacity: 0.3,
            shadow_offset: DEFAULT_SHADOW_OFFSET,
            metadata: MetadataRecord::default(),
        }
    }
}

/// Where the document to watermark comes from
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Pdf(PathBuf),
    /// Rendered to a temporary PDF before watermarking
    Markdown(PathBuf),
}

/// A validated watermarking job
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkJob {
    pub input: InputSource,
    pub output: PathBuf,
    pub watermark: WatermarkSpec,
    pub metadata: MetadataRecord,
}

/// The watermark source picked from the two exclusive options
enum Source {
    Image(PathBuf),
    Text(String),
}

impl WatermarkOptions {
    /// Validate the options into a job
    ///
    /// Checks run in a fixed order: watermark source, input document, shadow,
    /// then the settings of the chosen watermark kind. Nothing is read or
    /// written except the font path existence check.
    pub fn into_job(self) -> Result<WatermarkJob> {
        let text = self.watermark_text.filter(|t| !t.is_empty());
        let source = match (self.watermark_image, text) {
            (Some(_), Some(_)) => return Err(Error::ConflictingWatermarkSource),
            (None, None) => return Err(Error::MissingWatermarkSource),
            (Some(image), None) => Source::Image(image),
            (None, Some(text)) => Source::Text(text),
        };

        let input = match (self.input_pdf, self.markdown) {
            (Some(_), Some(_)) => return Err(Error::ConflictingInputDocument),
            (None, None) => return Err(Error::MissingInputDocument),
            (Some(pdf), None) => InputSource::Pdf(pdf),
            (None, Some(markdown)) => InputSource::Markdown(markdown),
        };

        let shadow = if self.shadow {
            if self.shadow_offset == 0 {
                return Err(Error::General("Shadow offset must be at least 1 pixel".to_string()));
            }
            Some(Shadow {
                opacity: Opacity::new("shadow opacity", self.shadow_opacity)?,
                offset: self.shadow_offset,
            })
        } else {
            None
        };

        let watermark = match source {
            Source::Image(image) => WatermarkSpec::Image(ImageWatermark {
                source: image,
                opacity: Opacity::new("image opacity", self.image_opacity)?,
                shadow,
            }),
            Source::Text(content) => {
                let color = parse_hex_color(&self.text_color)?;
                let opacity = Opacity::new("text opacity", self.text_opacity)?;

                if self.font_size == 0 {
                    return Err(Error::General("Font size must be at least 1".to_string()));
                }

                let font = match self.font_path {
                    Some(path) if !path.is_file() => return Err(Error::FontNotFound(path)),
                    Some(path) => FontRef::Path(path),
                    None => FontRef::Default,
                };

                WatermarkSpec::Text(TextWatermark {
                    content,
                    font,
                    font_size: self.font_size,
                    color,
                    opacity,
                    shadow,
                })
            }
        };

        Ok(WatermarkJob {
            input,
            output: self.output,
            watermark,
            metadata: self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorRgb;

    fn text_options(text: &str) -> WatermarkOptions {
        WatermarkOptions {
            input_pdf: Some(PathBuf::from("in.pdf")),
            watermark_text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let job = text_options("DRAFT").into_job().unwrap();
        assert_eq!(job.input, InputSource::Pdf(PathBuf::from("in.pdf")));

        match job.watermark {
            WatermarkSpec::Text(text) => {
                assert_eq!(text.content, "DRAFT");
                assert_eq!(text.font, FontRef::Default);
                assert_eq!(text.font_size, 36);
                assert_eq!(text.color, ColorRgb::black());
                assert_eq!(text.opacity.value(), 0.3);
                assert!(text.shadow.is_none());
            }
            other => panic!("expected text watermark, got {:?}", other),
        }
    }

    #[test]
    fn test_both_watermark_sources_rejected() {
        let options = WatermarkOptions {
            watermark_image: Some(PathBuf::from("logo.png")),
            ..text_options("DRAFT")
        };
        assert!(matches!(options.into_job(), Err(Error::ConflictingWatermarkSource)));
    }

    #[test]
    fn test_missing_watermark_source() {
        let options = WatermarkOptions {
            input_pdf: Some(PathBuf::from("in.pdf")),
            ..Default::default()
        };
        assert!(matches!(options.into_job(), Err(Error::MissingWatermarkSource)));

        // empty text counts as no text
        assert!(matches!(text_options("").into_job(), Err(Error::MissingWatermarkSource)));
    }

    #[test]
    fn test_watermark_source_checked_before_input() {
        let options = WatermarkOptions::default();
        assert!(matches!(options.into_job(), Err(Error::MissingWatermarkSource)));
    }

    #[test]
    fn test_input_document_exclusive() {
        let options = WatermarkOptions {
            markdown: Some(PathBuf::from("notes.md")),
            ..text_options("DRAFT")
        };
        assert!(matches!(options.into_job(), Err(Error::ConflictingInputDocument)));

        let options = WatermarkOptions {
            input_pdf: None,
            ..text_options("DRAFT")
        };
        assert!(matches!(options.into_job(), Err(Error::MissingInputDocument)));

        let options = WatermarkOptions {
            input_pdf: None,
            markdown: Some(PathBuf::from("notes.md")),
            ..text_options("DRAFT")
        };
        assert_eq!(
            options.into_job().unwrap().input,
            InputSource::Markdown(PathBuf::from("notes.md"))
        );
    }

    #[test]
    fn test_bad_color() {
        let options = WatermarkOptions {
            text_color: "#12345G".to_string(),
            ..text_options("DRAFT")
        };
        assert!(matches!(options.into_job(), Err(Error::InvalidColorFormat(_))));
    }

    #[test]
    fn test_color_ignored_for_image() {
        let options = WatermarkOptions {
            input_pdf: Some(PathBuf::from("in.pdf")),
            watermark_image: Some(PathBuf::from("logo.png")),
            text_color: "nonsense".to_string(),
            ..Default::default()
        };
        assert!(matches!(options.into_job().unwrap().watermark, WatermarkSpec::Image(_)));
    }

    #[test]
    fn test_opacity_out_of_range() {
        let options = WatermarkOptions {
            text_opacity: 1.5,
            ..text_options("DRAFT")
        };
        assert!(matches!(
            options.into_job(),
            Err(Error::InvalidOpacity { name: "text opacity", .. })
        ));

        let options = WatermarkOptions {
            shadow: true,
            shadow_opacity: -0.2,
            ..text_options("DRAFT")
        };
        assert!(matches!(
            options.into_job(),
            Err(Error::InvalidOpacity { name: "shadow opacity", .. })
        ));
    }

    #[test]
    fn test_shadow_settings() {
        let options = WatermarkOptions {
            shadow: true,
            shadow_opacity: 0.5,
            shadow_offset: 8,
            ..text_options("DRAFT")
        };
        let job = options.into_job().unwrap();
        let shadow = job.watermark.shadow().copied().unwrap();
        assert_eq!(shadow.offset, 8);
        assert_eq!(shadow.opacity.value(), 0.5);
    }

    #[test]
    fn test_missing_font_path() {
        let options = WatermarkOptions {
            font_path: Some(PathBuf::from("fonts/does-not-exist.ttf")),
            ..text_options("DRAFT")
        };
        assert!(matches!(options.into_job(), Err(Error::FontNotFound(_))));
    }

    #[test]
    fn test_zero_font_size() {
        let options = WatermarkOptions {
            font_size: 0,
            ..text_options("DRAFT")
        };
        assert!(matches!(options.into_job(), Err(Error::General(_))));
    }
}

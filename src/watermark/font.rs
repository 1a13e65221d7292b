//! Font resolution for text watermarks
//!
//! Fonts are resolved through an ordered chain, first success wins:
//! 1. an explicit font file (must exist)
//! 2. the default DejaVu Sans Bold, looked up in `fonts/` and in the usual
//!    system font directories
//! 3. the built-in fixed-size bitmap font, which ignores the requested size

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{GrayImage, Luma};
use log::debug;

use super::bitmap_font;
use crate::error::{Error, Result};

/// Environment variable naming an extra default font file
pub const DEFAULT_FONT_ENV: &str = "PDF_WATERMARK_FONT";

/// Font file names tried for the default font, in order
const DEFAULT_FONT_FILES: &[&str] = &["DejaVuSans-Bold.ttf", "dejavu-sans.bold.ttf"];

/// Which font a text watermark asks for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FontRef {
    /// Use the default font chain
    #[default]
    Default,
    /// Use this font file
    Path(PathBuf),
}

/// A font ready to rasterize text
pub enum ResolvedFont {
    /// Outline font at the requested pixel size
    Outline { font: FontVec, size: f32, source: PathBuf },
    /// Built-in bitmap font at its fixed size
    Builtin,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedFont::Outline { size, source, .. } => f
                .debug_struct("Outline")
                .field("size", size)
                .field("source", source)
                .finish(),
            ResolvedFont::Builtin => f.write_str("Builtin"),
        }
    }
}

impl ResolvedFont {
    /// Whether the requested font size is actually applied
    pub fn honors_size(&self) -> bool {
        matches!(self, ResolvedFont::Outline { .. })
    }

    /// Rasterize `text` into a coverage mask
    ///
    /// Lines split on `\n` are stacked and left aligned. The mask may carry
    /// empty margins; callers measure the tight box themselves.
    pub fn rasterize(&self, text: &str) -> GrayImage {
        match self {
            ResolvedFont::Outline { font, size, .. } => rasterize_outline(font, *size, text),
            ResolvedFont::Builtin => bitmap_font::rasterize(text),
        }
    }
}

/// Resolve a font reference at the requested size
pub fn resolve_font(font: &FontRef, size: u32) -> Result<ResolvedFont> {
    match font {
        FontRef::Path(path) => {
            if !path.is_file() {
                return Err(Error::FontNotFound(path.clone()));
            }
            load_font_file(path, size)
        }
        FontRef::Default => {
            for candidate in default_font_candidates() {
                if !candidate.is_file() {
                    continue;
                }
                match load_font_file(&candidate, size) {
                    Ok(resolved) => {
                        debug!("Using default font {}", candidate.display());
                        return Ok(resolved);
                    }
                    Err(e) => debug!("Skipping default font candidate: {}", e),
                }
            }

            debug!("Default font not found in any known location");
            Ok(ResolvedFont::Builtin)
        }
    }
}

fn load_font_file(path: &Path, size: u32) -> Result<ResolvedFont> {
    let data = std::fs::read(path)?;
    let font = FontVec::try_from_vec(data).map_err(|e| Error::InvalidFont {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(ResolvedFont::Outline {
        font,
        size: size as f32,
        source: path.to_path_buf(),
    })
}

/// Places the default font may live, most specific first
fn default_font_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(path) = std::env::var(DEFAULT_FONT_ENV) {
        if !path.trim().is_empty() {
            candidates.push(PathBuf::from(path.trim()));
        }
    }

    let mut dirs: Vec<PathBuf> = vec![PathBuf::from("fonts")];
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir.join("fonts"));
    }

    #[cfg(target_os = "linux")]
    dirs.extend([
        PathBuf::from("/usr/share/fonts/truetype/dejavu"),
        PathBuf::from("/usr/share/fonts/dejavu"),
        PathBuf::from("/usr/share/fonts/TTF"),
    ]);
    #[cfg(target_os = "macos")]
    dirs.extend([PathBuf::from("/Library/Fonts"), PathBuf::from("/opt/homebrew/share/fonts")]);
    #[cfg(target_os = "windows")]
    dirs.push(PathBuf::from(r"C:\Windows\Fonts"));

    for dir in dirs {
        for name in DEFAULT_FONT_FILES {
            candidates.push(dir.join(name));
        }
    }

    candidates
}

fn rasterize_outline(font: &FontVec, size: f32, text: &str) -> GrayImage {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let line_advance = scaled.height() + scaled.line_gap();

    let mut outlined = Vec::new();
    for (row, line) in text.split('\n').enumerate() {
        let baseline = scaled.ascent() + row as f32 * line_advance;
        let mut caret = 0.0f32;
        let mut previous = None;

        for c in line.chars() {
            let glyph_id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
            if let Some(outline) = font.outline_glyph(glyph) {
                outlined.push(outline);
            }
            caret += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
    }

    let Some((min_x, min_y, max_x, max_y)) = outlined
        .iter()
        .map(|g| {
            let b = g.px_bounds();
            (b.min.x, b.min.y, b.max.x, b.max.y)
        })
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
    else {
        return GrayImage::new(1, 1);
    };

    let width = ((max_x - min_x).ceil() as u32).max(1);
    let height = ((max_y - min_y).ceil() as u32).max(1);
    let mut mask = GrayImage::new(width, height);

    for glyph in &outlined {
        let bounds = glyph.px_bounds();
        let left = (bounds.min.x - min_x).round() as u32;
        let top = (bounds.min.y - min_y).round() as u32;

        glyph.draw(|px, py, coverage| {
            let (x, y) = (left + px, top + py);
            if x >= width || y >= height {
                return;
            }
            let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            let existing = mask.get_pixel(x, y)[0];
            if value > existing {
                mask.put_pixel(x, y, Luma([value]));
            }
        });
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_font() {
        let result = resolve_font(&FontRef::Path(PathBuf::from("no/such/font.ttf")), 36);
        assert!(matches!(result, Err(Error::FontNotFound(ref p)) if p == Path::new("no/such/font.ttf")));
    }

    #[test]
    fn test_invalid_font_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let result = resolve_font(&FontRef::Path(path), 36);
        assert!(matches!(result, Err(Error::InvalidFont { .. })));
    }

    #[test]
    fn test_default_chain_always_resolves() {
        // Either an installed DejaVu font or the built-in fallback
        let resolved = resolve_font(&FontRef::Default, 36).unwrap();
        let mask = resolved.rasterize("DRAFT");
        assert!(mask.pixels().any(|p| p[0] > 0));
    }

    #[test]
    fn test_builtin_ignores_size() {
        let font = ResolvedFont::Builtin;
        assert!(!font.honors_size());
        assert_eq!(font.rasterize("X").height(), bitmap_font::FIXED_SIZE);
    }
}

//! Minimal Markdown to PDF rendering
//!
//! Only a line-oriented subset is understood: `#` to `####` headings, `- `
//! bullets and plain paragraphs. Everything is set in Helvetica on A4 pages.

use std::fs;
use std::path::Path;

use chrono::Local;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::layout::PageSize;
use crate::pdf::document::format_number;
use crate::pdf::{DocumentBackend, PdfDocument};

/// Page margin on every side, in points
const MARGIN: f32 = 50.0;

/// Body text size, in points
const BODY_SIZE: f32 = 12.0;

/// Baseline advance as a multiple of the font size
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Helvetica ascender height as a fraction of the font size
const HELVETICA_ASCENT: f32 = 0.718;

/// Resource name of the Helvetica font on every page
const FONT_NAME: &str = "F1";

/// Heading prefixes and their sizes, longest prefix first
const HEADINGS: [(&str, f32); 4] = [("#### ", 16.0), ("### ", 18.0), ("## ", 20.0), ("# ", 24.0)];

/// One positioned line of text
#[derive(Debug, Clone, PartialEq)]
struct PlacedLine {
    size: f32,
    /// Top of the text box, measured from the top of the page
    top: f32,
    text: String,
}

impl PlacedLine {
    /// Baseline, one ascent below the top of the box
    fn baseline(&self) -> f32 {
        self.top + HELVETICA_ASCENT * self.size
    }
}

/// Classify a source line into (font size, display text)
fn classify(line: &str) -> (f32, String) {
    for (prefix, size) in HEADINGS {
        if let Some(rest) = line.strip_prefix(prefix) {
            return (size, rest.to_string());
        }
    }

    if let Some(rest) = line.strip_prefix("- ") {
        return (BODY_SIZE, format!("\u{2022} {}", rest));
    }

    (BODY_SIZE, line.to_string())
}

/// Lay out Markdown source into pages of positioned lines
fn layout_pages(source: &str, page: PageSize) -> Vec<Vec<PlacedLine>> {
    let max_width = page.width - 2.0 * MARGIN;
    let bottom = page.height - MARGIN;

    let mut pages = vec![Vec::new()];
    let mut y = MARGIN;

    for raw in source.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            y += BODY_SIZE * LINE_HEIGHT_FACTOR;
            continue;
        }

        let (size, text) = classify(line);
        for wrapped in wrap_text(&text, size, max_width) {
            if y + size > bottom {
                pages.push(Vec::new());
                y = MARGIN;
            }
            if let Some(current) = pages.last_mut() {
                current.push(PlacedLine { size, top: y, text: wrapped });
            }
            y += size * LINE_HEIGHT_FACTOR;
        }
    }

    pages
}

/// Break `text` into lines no wider than `max_width`
///
/// Breaks only at spaces; a single word wider than the line stays whole.
fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if text_width(&candidate, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Width of `text` set in Helvetica at `size` points
fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| helvetica_width(win_ansi_byte(c))).sum();
    units as f32 * size / 1000.0
}

/// Helvetica advance width in 1/1000 em for a WinAnsi code
fn helvetica_width(code: u8) -> u32 {
    const ASCII: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space to /
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 to 9
        278, 278, 584, 584, 584, 556, 1015, // : to @
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A to M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N to Z
        278, 278, 278, 469, 556, 333, // [ to `
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a to m
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n to z
        334, 260, 334, 584, // { to ~
    ];

    match code {
        32..=126 => ASCII[(code - 32) as usize] as u32,
        0x95 => 350,
        0x85 | 0x97 => 1000,
        0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x96 => 556,
        _ => 556,
    }
}

/// Map a character to its WinAnsiEncoding byte, `?` when unrepresentable
fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
        '\u{20AC}' => 0x80,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        _ => b'?',
    }
}

/// Encode text as an escaped PDF literal string body
fn encode_literal(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = win_ansi_byte(c);
        if matches!(byte, b'\\' | b'(' | b')') {
            bytes.push(b'\\');
        }
        bytes.push(byte);
    }
    bytes
}

/// Content stream drawing one page of lines
fn page_content(lines: &[PlacedLine], page: PageSize) -> Vec<u8> {
    let mut content = Vec::new();
    for line in lines {
        let header = format!(
            "BT\n/{} {} Tf\n1 0 0 1 {} {} Tm\n(",
            FONT_NAME,
            format_number(line.size),
            format_number(MARGIN),
            format_number(page.height - line.baseline())
        );
        content.extend_from_slice(header.as_bytes());
        content.extend_from_slice(&encode_literal(&line.text));
        content.extend_from_slice(b") Tj\nET\n");
    }
    content
}

fn add_helvetica_font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Render Markdown source into a new PDF document
pub fn render_markdown(source: &str) -> Document {
    let page = PageSize::a4();
    let pages = layout_pages(source, page);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = add_helvetica_font(&mut doc);

    let mut kids = Vec::with_capacity(pages.len());
    for lines in &pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), page_content(lines, page)));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(page.width), Object::Real(page.height)],
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    FONT_NAME => font_id,
                },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let producer = format!("pdf-watermark {}", env!("CARGO_PKG_VERSION"));
    let created = Local::now().format("D:%Y%m%d%H%M%S").to_string();
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::String(producer.into_bytes(), StringFormat::Literal),
        "CreationDate" => Object::String(created.into_bytes(), StringFormat::Literal),
    });
    doc.trailer.set("Info", info_id);

    debug!("Laid out Markdown into {} page(s)", pages.len());
    doc
}

/// Render a Markdown file to a PDF at `output`
pub fn render_markdown_file(input: &Path, output: &Path) -> Result<()> {
    let bytes = fs::read(input).map_err(|e| Error::SourceDocument {
        path: input.to_path_buf(),
        reason: e.to_string(),
    })?;
    let source = String::from_utf8_lossy(&bytes);

    info!("Rendering Markdown {}", input.display());
    let mut doc = PdfDocument::from_document(render_markdown(&source));
    doc.save(output)
}

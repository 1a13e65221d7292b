//! lopdf-backed document handle
//!
//! Wraps a loaded [`lopdf::Document`] and implements [`DocumentBackend`]:
//! page geometry, image overlays, Info dictionary metadata and saving.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::ImageFormat;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use log::debug;

use super::{DocumentBackend, MetadataKey};
use crate::error::{Error, Result};
use crate::layout::{PageSize, Rect};

/// Prefix for the XObject resource names we add to pages
const XOBJECT_PREFIX: &str = "Wm";

/// A PDF document opened for watermarking
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    /// Image XObjects already embedded, keyed by a hash of their PNG bytes
    images: HashMap<u64, ObjectId>,
    /// Pages whose original content has been wrapped in q/Q
    isolated: HashSet<ObjectId>,
}

impl PdfDocument {
    /// Load a PDF from disk
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::SourceDocument {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let doc = Document::load(path).map_err(|e| Error::SourceDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            images: HashMap::new(),
            isolated: HashSet::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.doc
    }

    /// Page box as (x0, y0, x1, y1) in PDF user space
    ///
    /// CropBox wins over MediaBox; both may be inherited from the page tree.
    fn page_box(&self, page_id: ObjectId) -> (f32, f32, f32, f32) {
        [b"CropBox".as_slice(), b"MediaBox".as_slice()]
            .iter()
            .find_map(|key| inherited_attribute(&self.doc, page_id, key).and_then(|o| parse_box(&self.doc, o)))
            .unwrap_or_else(|| {
                let letter = PageSize::letter();
                (0.0, 0.0, letter.width, letter.height)
            })
    }

    /// Clockwise display rotation of a page: 0, 90, 180 or 270
    ///
    /// `/Rotate` is inheritable; values that are not a multiple of 90 count as 0.
    fn page_rotation(&self, page_id: ObjectId) -> u32 {
        let degrees = inherited_attribute(&self.doc, page_id, b"Rotate")
            .map(|o| resolve(&self.doc, o))
            .and_then(|o| o.as_i64().ok().or_else(|| o.as_float().ok().map(|f| f.round() as i64)))
            .unwrap_or(0)
            .rem_euclid(360);

        match degrees {
            90 | 180 | 270 => degrees as u32,
            _ => 0,
        }
    }

    /// Embed the PNG as an image XObject, reusing an earlier embedding of the same bytes
    fn image_xobject(&mut self, png: &[u8]) -> Result<ObjectId> {
        let mut hasher = DefaultHasher::new();
        png.hash(&mut hasher);
        let key = hasher.finish();

        if let Some(id) = self.images.get(&key) {
            return Ok(*id);
        }

        let rgba = image::load_from_memory_with_format(png, ImageFormat::Png)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in rgba.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel[3]);
        }

        let smask_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ));

        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "SMask" => smask_id,
            },
            rgb,
        ));

        debug!("Embedded {}x{} watermark image as object {:?}", width, height, image_id);
        self.images.insert(key, image_id);
        Ok(image_id)
    }

    /// Register the XObject under a fresh name in the page's own Resources
    ///
    /// Inherited or referenced resources are copied onto the page first so
    /// other pages sharing them are not affected.
    fn add_xobject_to_page_resources(&mut self, page_id: ObjectId, xobject_id: ObjectId) -> Result<String> {
        let mut resources = inherited_attribute(&self.doc, page_id, b"Resources")
            .and_then(|o| resolve(&self.doc, o).as_dict().ok())
            .cloned()
            .unwrap_or_default();

        let mut xobjects = resources
            .get(b"XObject")
            .ok()
            .and_then(|o| resolve(&self.doc, o).as_dict().ok())
            .cloned()
            .unwrap_or_default();

        let name = (1..)
            .map(|n| format!("{}{}", XOBJECT_PREFIX, n))
            .find(|candidate| !xobjects.has(candidate.as_bytes()))
            .unwrap_or_else(|| XOBJECT_PREFIX.to_string());

        xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
        resources.set("XObject", Object::Dictionary(xobjects));

        let page = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Resources", Object::Dictionary(resources));

        Ok(name)
    }

    /// Current content stream references of a page, flattening an indirect array
    fn page_contents(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let page = self.doc.get_dictionary(page_id)?;
        let contents = match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        Ok(contents)
    }

    /// Append a content stream, wrapping the original content in q/Q the first time
    ///
    /// The wrap keeps any transformation left behind by the original content
    /// from leaking into the overlay.
    fn append_overlay_content(&mut self, page_id: ObjectId, content: String) -> Result<()> {
        let mut contents = self.page_contents(page_id)?;

        if self.isolated.insert(page_id) && !contents.is_empty() {
            let save_id = self.doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            let restore_id = self.doc.add_object(Stream::new(Dictionary::new(), b"Q\n".to_vec()));
            contents.insert(0, Object::Reference(save_id));
            contents.push(Object::Reference(restore_id));
        }

        let overlay_id = self.doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        contents.push(Object::Reference(overlay_id));

        let page = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Contents", Object::Array(contents));
        Ok(())
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// The trailer's Info dictionary, created when missing
    fn info_dictionary_mut(&mut self) -> Result<&mut Dictionary> {
        let info_ref = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Dictionary(_)) => None,
            _ => {
                let id = self.doc.add_object(Dictionary::new());
                self.doc.trailer.set("Info", Object::Reference(id));
                Some(id)
            }
        };

        match info_ref {
            Some(id) => Ok(self.doc.get_object_mut(id)?.as_dict_mut()?),
            None => Ok(self.doc.trailer.get_mut(b"Info")?.as_dict_mut()?),
        }
    }
}

impl DocumentBackend for PdfDocument {
    fn page_sizes(&self) -> Vec<PageSize> {
        self.pages
            .iter()
            .map(|id| {
                let (x0, y0, x1, y1) = self.page_box(*id);
                match self.page_rotation(*id) {
                    90 | 270 => PageSize::new(y1 - y0, x1 - x0),
                    _ => PageSize::new(x1 - x0, y1 - y0),
                }
            })
            .collect()
    }

    fn insert_image(&mut self, page_index: usize, rect: Rect, png: &[u8]) -> Result<()> {
        let page_id = *self.pages.get(page_index).ok_or_else(|| {
            Error::General(format!("Page index {} out of range ({} pages)", page_index, self.pages.len()))
        })?;

        let image_id = self.image_xobject(png)?;
        let name = self.add_xobject_to_page_resources(page_id, image_id)?;

        let matrix = placement_matrix(self.page_box(page_id), self.page_rotation(page_id), rect);
        let operands: Vec<String> = matrix.iter().map(|v| format_number(*v)).collect();

        let content = format!("q\n{} cm\n/{} Do\nQ\n", operands.join(" "), name);
        self.append_overlay_content(page_id, content)
    }

    fn metadata(&self, key: MetadataKey) -> Option<String> {
        let value = self.info_dictionary()?.get(key.info_key()).ok()?;
        match resolve(&self.doc, value) {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    fn set_metadata(&mut self, key: MetadataKey, value: &str) -> Result<()> {
        let info = self.info_dictionary_mut()?;
        info.set(key.info_key(), encode_text_string(value));
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let backend_error = |reason: String| Error::BackendIo {
            path: path.to_path_buf(),
            reason,
        };

        // Write next to the target and rename, so a failed save leaves nothing behind
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(".pdf-watermark-")
            .suffix(".pdf")
            .tempfile_in(&dir)
            .map_err(|e| backend_error(e.to_string()))?;

        self.doc.compress();
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.doc.save_to(&mut writer).map_err(|e| backend_error(e.to_string()))?;
            writer.flush().map_err(|e| backend_error(e.to_string()))?;
        }

        temp.persist(path).map_err(|e| backend_error(e.error.to_string()))?;
        Ok(())
    }
}

/// Image matrix placing the unit square at `rect`, upright as displayed
///
/// `rect` is in displayed page space: top-left origin, y down, after the
/// page's `/Rotate` has been applied. The result maps it back into unrotated
/// PDF user space of the page box `(x0, y0, x1, y1)`.
fn placement_matrix(page_box: (f32, f32, f32, f32), rotation: u32, rect: Rect) -> [f32; 6] {
    let (x0, y0, x1, y1) = page_box;
    let (w, h) = (rect.width(), rect.height());

    match rotation {
        90 => [0.0, w, -h, 0.0, x0 + rect.y1, y0 + rect.x0],
        180 => [-w, 0.0, 0.0, -h, x1 - rect.x0, y0 + rect.y1],
        270 => [0.0, -w, h, 0.0, x1 - rect.y1, y1 - rect.x0],
        _ => [w, 0.0, 0.0, h, x0 + rect.x0, y1 - rect.y1],
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    // depth guard against malformed, cyclic page trees
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Follow a single indirect reference
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Parse a rectangle array into normalized (x0, y0, x1, y1)
fn parse_box(doc: &Document, object: &Object) -> Option<(f32, f32, f32, f32)> {
    let values: Vec<f32> = resolve(doc, object)
        .as_array()
        .ok()?
        .iter()
        .filter_map(|o| resolve(doc, o).as_float().ok())
        .collect();

    if values.len() != 4 {
        return None;
    }

    Some((
        values[0].min(values[2]),
        values[1].min(values[3]),
        values[0].max(values[2]),
        values[1].max(values[3]),
    ))
}

/// Format a coordinate for a content stream without exponent notation
pub(crate) fn format_number(value: f32) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" || text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Encode a PDF text string: literal for ASCII, UTF-16BE with BOM otherwise
pub fn encode_text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string (UTF-16BE, UTF-8 with BOM, or PDFDocEncoding)
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }

    // PDFDocEncoding agrees with Latin-1 for printable characters
    bytes.iter().map(|&b| b as char).collect()
}

//! Document session state.
//!
//! A [`Session`] owns the loaded document, the current page index, the
//! pending signature, and the overlay geometry. The editing model is
//! single-threaded and event-driven, so the session uses interior
//! mutability (`Cell`/`RefCell`) and is passed around by shared reference;
//! it is deliberately not `Sync`.

use std::cell::{Cell, RefCell};

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::LoadError;
use crate::models::config::PenmarkConfig;
use crate::overlay::{DragDelta, OverlayGeometry, ResizeDelta};
use crate::signature::SignatureImage;

/// Fallback page size when a page carries no resolvable MediaBox (A4).
const FALLBACK_PAGE_SIZE: (f64, f64) = (595.0, 842.0);

/// One in-memory editing session: a document, a page cursor, a pending
/// signature, and the overlay box hovering over the render.
pub struct Session {
    pub(crate) config: PenmarkConfig,
    pub(crate) document: RefCell<Option<Document>>,
    current_page: Cell<u32>,
    page_count: Cell<Option<u32>>,
    pub(crate) signature: RefCell<SignatureImage>,
    pub(crate) overlay: RefCell<OverlayGeometry>,
    pub(crate) embed_in_flight: Cell<bool>,
}

impl Session {
    pub fn new(config: PenmarkConfig) -> Self {
        let overlay = OverlayGeometry::default_for(&config.overlay);
        Self {
            config,
            document: RefCell::new(None),
            current_page: Cell::new(1),
            page_count: Cell::new(None),
            signature: RefCell::new(SignatureImage::default()),
            overlay: RefCell::new(overlay),
            embed_in_flight: Cell::new(false),
        }
    }

    pub fn config(&self) -> &PenmarkConfig {
        &self.config
    }

    /// Parse a PDF byte stream into this session.
    ///
    /// On success the page cursor resets to 1 and the page count becomes
    /// known. On failure the session keeps whatever it held before.
    pub fn load(&self, bytes: &[u8]) -> Result<(), LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::EmptyInput);
        }

        let mut doc = Document::load_mem(bytes).map_err(|e| LoadError::Parse(e.to_string()))?;

        // PDFs encrypted with an empty owner password are still usable.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(LoadError::Encrypted);
            }
            debug!("decrypted PDF with empty password");
        }

        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(LoadError::NoPages);
        }

        debug!(pages = page_count, "loaded PDF");
        *self.document.borrow_mut() = Some(doc);
        self.page_count.set(Some(page_count));
        self.current_page.set(1);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.document.borrow().is_some()
    }

    /// Number of pages, unknown until a document has been parsed.
    pub fn page_count(&self) -> Option<u32> {
        self.page_count.get()
    }

    /// Current page index, 1-based.
    pub fn current_page(&self) -> u32 {
        self.current_page.get()
    }

    /// Move the page cursor, clamped into `[1, page_count]`. A no-op while
    /// the page count is unknown; collaborators disable navigation then.
    pub fn go_to_page(&self, n: u32) {
        if let Some(count) = self.page_count.get() {
            self.current_page.set(n.clamp(1, count));
        }
    }

    pub fn next_page(&self) {
        self.go_to_page(self.current_page.get().saturating_add(1));
    }

    pub fn prev_page(&self) {
        self.go_to_page(self.current_page.get().saturating_sub(1).max(1));
    }

    /// Store a freshly captured signature. The overlay becomes visible iff
    /// the signature is non-empty, and a fresh capture starts over from the
    /// default box rather than inheriting the previous placement.
    pub fn set_signature(&self, data_uri: impl Into<String>) {
        let signature = SignatureImage::new(data_uri);
        let visible = !signature.is_empty();
        {
            let mut overlay = self.overlay.borrow_mut();
            if visible {
                *overlay = OverlayGeometry::default_for(&self.config.overlay);
            }
            overlay.visible = visible;
        }
        *self.signature.borrow_mut() = signature;
    }

    pub fn signature(&self) -> SignatureImage {
        self.signature.borrow().clone()
    }

    /// Snapshot of the current overlay geometry.
    pub fn overlay(&self) -> OverlayGeometry {
        *self.overlay.borrow()
    }

    pub fn set_overlay(&self, geometry: OverlayGeometry) {
        *self.overlay.borrow_mut() = geometry;
    }

    /// Feed one drag movement from the gesture source into the overlay.
    pub fn drag_overlay(&self, delta: DragDelta) {
        let next = self.overlay().apply_drag(delta);
        self.set_overlay(next);
    }

    /// Feed one resize movement from the gesture source into the overlay.
    pub fn resize_overlay(&self, delta: ResizeDelta) {
        let next = self.overlay().apply_resize(delta, &self.config.overlay);
        self.set_overlay(next);
    }

    /// Native page size `(width, height)` in page units, MediaBox with
    /// parent inheritance.
    pub fn page_size(&self, page: u32) -> Option<(f64, f64)> {
        let doc = self.document.borrow();
        let doc = doc.as_ref()?;
        let page_id = *doc.get_pages().get(&page)?;
        Some(page_dimensions(doc, page_id))
    }

    /// Native page height in page units, for building a render context.
    pub fn page_height(&self, page: u32) -> Option<f64> {
        self.page_size(page).map(|(_, h)| h)
    }

    /// Filename to offer the export collaborator: the document title when
    /// there is one, a plain default otherwise.
    pub fn suggested_filename(&self) -> String {
        let doc = self.document.borrow();
        match doc.as_ref().and_then(document_title) {
            Some(title) => format!("{}-signed.pdf", sanitize_filename(&title)),
            None => "signed.pdf".to_string(),
        }
    }

    /// Discard the document and return every piece of session state to its
    /// initial value. The overlay reset is coupled to the document reset; a
    /// stale overlay box surviving a reset would misplace the next
    /// signature.
    pub fn reset(&self) {
        *self.document.borrow_mut() = None;
        self.page_count.set(None);
        self.current_page.set(1);
        *self.signature.borrow_mut() = SignatureImage::default();
        *self.overlay.borrow_mut() = OverlayGeometry::default_for(&self.config.overlay);
        debug!("session reset");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PenmarkConfig::default())
    }
}

/// Resolve a page's dimensions from its MediaBox, walking up the page tree
/// for inherited values.
pub(crate) fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let Ok(dict) = doc.get_object(id).and_then(|o| o.as_dict()) else {
            break;
        };
        if let Some(size) = media_box_size(doc, dict) {
            return size;
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    FALLBACK_PAGE_SIZE
}

fn media_box_size(doc: &Document, dict: &lopdf::Dictionary) -> Option<(f64, f64)> {
    let raw = dict.get(b"MediaBox").ok()?;
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = object_as_f64(&arr[0])?;
    let lly = object_as_f64(&arr[1])?;
    let urx = object_as_f64(&arr[2])?;
    let ury = object_as_f64(&arr[3])?;
    Some((urx - llx, ury - lly))
}

pub(crate) fn object_as_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

fn document_title(doc: &Document) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let info_dict = match info {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let title = match info_dict.get(b"Title").ok()? {
        Object::String(bytes, _) => decode_pdf_text(bytes),
        _ => return None,
    };
    let title = title.trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// PDF text strings are either UTF-16BE with a BOM or PDFDocEncoding; the
/// latter is close enough to Latin-1 for a filename hint.
fn decode_pdf_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.chars().take(64).collect()
    }
}

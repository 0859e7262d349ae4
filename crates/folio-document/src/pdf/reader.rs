// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF source documents — open an existing PDF with `lopdf`, enumerate its
// pages, and materialise operation plans from it.

use std::path::Path;

use folio_core::error::{FolioError, Result};
use folio_core::types::{CropMargins, OperationPlan};
use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::writer::PdfWriter;

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when a page carries no MediaBox anywhere in its ancestry.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Visible dimensions of one page, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
    pub rotation: i64,
}

/// An opened source document.
///
/// Wraps `lopdf::Document` and keeps its page object ids in page order so
/// plans can address pages by 0-based index.
pub struct SourceDocument {
    /// The underlying lopdf document.
    document: Document,
    /// Page object ids, index 0 = page 1.
    page_ids: Vec<ObjectId>,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl SourceDocument {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(FolioError::NotFound(path_ref.display().to_string()));
        }
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            FolioError::Parse(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        let mut source = Self::from_document(document);
        source.source_path = Some(path_ref.display().to_string());
        debug!(pages = source.page_count(), "PDF loaded");
        Ok(source)
    }

    /// Create a source from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| FolioError::Parse(format!("failed to load PDF from memory: {}", err)))?;

        let source = Self::from_document(document);
        debug!(pages = source.page_count(), "PDF loaded from bytes");
        Ok(source)
    }

    fn from_document(document: Document) -> Self {
        // lopdf keys pages by 1-indexed page number, so the map is already in order.
        let page_ids = document.get_pages().into_values().collect();
        Self {
            document,
            page_ids,
            source_path: None,
        }
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Return the source path if the document was created via [`SourceDocument::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    /// Object id of the page at a 0-based index.
    pub(crate) fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            FolioError::InvalidParameter(format!(
                "page {} out of range (document has {} pages)",
                index + 1,
                self.page_count()
            ))
        })
    }

    /// Size and rotation of the page at a 0-based index, as a viewer shows it.
    pub fn page_size(&self, index: usize) -> Result<PageSize> {
        let media = self.visible_box(index)?;
        Ok(PageSize {
            width: (media[2] - media[0]).abs(),
            height: (media[3] - media[1]).abs(),
            rotation: self.page_rotation(index)?,
        })
    }

    /// Effective CropBox, falling back to the MediaBox, of the page at a
    /// 0-based index.
    fn visible_box(&self, index: usize) -> Result<[f64; 4]> {
        let page_id = self.page_id(index)?;
        Ok(self
            .inherited(page_id, b"CropBox")
            .or_else(|| self.inherited(page_id, b"MediaBox"))
            .and_then(|obj| rect(&self.document, &obj))
            .unwrap_or(DEFAULT_MEDIA_BOX))
    }

    /// Fail with `InvalidParameter` if `crop` would leave any page without a
    /// visible area.
    pub fn check_crop(&self, crop: &CropMargins) -> Result<()> {
        for index in 0..self.page_count() {
            crop.apply(self.visible_box(index)?).map_err(|err| match err {
                FolioError::InvalidParameter(message) => {
                    FolioError::InvalidParameter(format!("page {}: {}", index + 1, message))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Effective `/Rotate` of the page at a 0-based index, normalised to `0..360`.
    pub fn page_rotation(&self, index: usize) -> Result<i64> {
        let page_id = self.page_id(index)?;
        Ok(self
            .inherited(page_id, b"Rotate")
            .and_then(|obj| resolve(&self.document, &obj).as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360))
    }

    /// Look up `key` on a page, walking up `/Parent` links until found.
    pub(crate) fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut current = Some(page_id);
        // Bounded walk; malformed files can contain parent cycles.
        for _ in 0..64 {
            let dict = self.document.get_dictionary(current?).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value.clone());
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }

    // -- Materialisation ------------------------------------------------------

    /// Produce a new PDF containing the plan's pages, in order, with each
    /// page's rotation and crop applied. Returns the serialised bytes.
    #[instrument(skip_all, fields(pages = plan.len()))]
    pub fn render_plan(&self, plan: &OperationPlan, pdf_version: &str) -> Result<Vec<u8>> {
        let mut writer = PdfWriter::new(pdf_version);
        writer.append_pages(self, plan.pages())?;
        let output = writer.finish()?;
        debug!(output_bytes = output.len(), "Plan materialised");
        Ok(output)
    }
}

/// Follow a single level of indirection.
pub(crate) fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

/// Read a `[llx lly urx ury]` rectangle, resolving indirect entries.
pub(crate) fn rect(document: &Document, object: &Object) -> Option<[f64; 4]> {
    let items = resolve(document, object).as_array().ok()?;
    if items.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = number(resolve(document, item))?;
    }
    // Normalise so lower-left really is lower-left.
    Some([
        out[0].min(out[2]),
        out[1].min(out[3]),
        out[0].max(out[2]),
        out[1].max(out[3]),
    ])
}

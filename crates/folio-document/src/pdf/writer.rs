// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — assemble a new document from pages copied out of one or more
// source documents, applying each page's rotation and crop on the way.

use std::collections::BTreeMap;

use folio_core::error::{FolioError, Result};
use folio_core::types::{CropMargins, PageRef, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use tracing::{debug, instrument, trace};

use super::reader::{INHERITABLE, SourceDocument, rect, resolve};

/// Builds a fresh PDF page by page.
///
/// Objects reachable from a copied page (content streams, fonts, images) are
/// copied once per source document and shared between the pages that use
/// them.
pub struct PdfWriter {
    target: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PdfWriter {
    pub fn new(pdf_version: &str) -> Self {
        let mut target = Document::with_version(pdf_version);
        let pages_id = target.new_object_id();
        Self {
            target,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append the referenced pages of `source`, in order.
    #[instrument(skip_all, fields(pages = refs.len()))]
    pub fn append_pages(&mut self, source: &SourceDocument, refs: &[PageRef]) -> Result<()> {
        let mut copier = ObjectCopier::new(source.document());
        for page_ref in refs {
            let page_id = source.page_id(page_ref.source_index)?;
            let new_id = self.copy_page(source, &mut copier, page_id, page_ref)?;
            self.kids.push(new_id);
            debug!(
                page = page_ref.page_number(),
                rotation = page_ref.rotation.degrees(),
                cropped = page_ref.crop.is_some(),
                "Page copied"
            );
        }
        Ok(())
    }

    fn copy_page(
        &mut self,
        source: &SourceDocument,
        copier: &mut ObjectCopier<'_>,
        page_id: ObjectId,
        page_ref: &PageRef,
    ) -> Result<ObjectId> {
        let mut page = source
            .document()
            .get_dictionary(page_id)
            .map_err(|err| {
                FolioError::Parse(format!("cannot read page object {:?}: {}", page_id, err))
            })?
            .clone();

        // The copy is detached from the source tree, so pull down anything it
        // would otherwise inherit from there.
        for key in INHERITABLE {
            if !page.has(key) {
                if let Some(value) = source.inherited(page_id, key) {
                    page.set(key.to_vec(), value);
                }
            }
        }
        page.remove(b"Parent");

        apply_rotation(source.document(), &mut page, page_ref.rotation);
        if let Some(crop) = &page_ref.crop {
            apply_crop(source.document(), &mut page, crop)?;
        }

        // Reserve the id first so annotations pointing back at this page
        // (/P entries) land on the copy rather than dragging in the original.
        let new_id = self.target.new_object_id();
        copier.remap.insert(page_id, new_id);
        let mut copied = copier.copy_dictionary(&mut self.target, &page);
        copier.remap.remove(&page_id);

        copied.set("Parent", Object::Reference(self.pages_id));
        self.target.objects.insert(new_id, Object::Dictionary(copied));
        Ok(new_id)
    }

    /// Close the page tree and serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.kids.is_empty() {
            return Err(FolioError::EmptyResult);
        }

        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.kids.len() as i64,
        };
        self.target
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.target.trailer.set("Root", catalog_id);

        let mut output = Vec::new();
        self.target
            .save_to(&mut output)
            .map_err(|err| FolioError::WriteFailure(format!("failed to serialise PDF: {}", err)))?;
        Ok(output)
    }
}

/// Compose the requested rotation with whatever the page already carries.
fn apply_rotation(document: &Document, page: &mut Dictionary, rotation: Rotation) {
    if rotation.is_none() {
        return;
    }
    let existing = page
        .get(b"Rotate")
        .ok()
        .and_then(|obj| resolve(document, obj).as_i64().ok())
        .unwrap_or(0);
    let composed = rotation.applied_to(existing);
    trace!(existing, composed, "Rotating page");
    page.set("Rotate", Object::Integer(composed));
}

/// Shrink the visible area by setting a CropBox inside the current one.
fn apply_crop(document: &Document, page: &mut Dictionary, crop: &CropMargins) -> Result<()> {
    let current = page
        .get(b"CropBox")
        .ok()
        .or_else(|| page.get(b"MediaBox").ok())
        .and_then(|obj| rect(document, obj))
        .ok_or_else(|| FolioError::Parse("page has no usable MediaBox".into()))?;
    let [llx, lly, urx, ury] = crop.apply(current)?;
    let cropped: Vec<Object> = [llx, lly, urx, ury]
        .iter()
        .map(|v| (*v as f32).into())
        .collect();
    page.set("CropBox", cropped);
    Ok(())
}

/// Deep copy of objects from one document into another, remembering what has
/// already been copied so shared resources stay shared.
struct ObjectCopier<'a> {
    source: &'a Document,
    remap: BTreeMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            remap: BTreeMap::new(),
        }
    }

    fn copy_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut out = Dictionary::new();
        // A /Parent reaching the source page tree lands on a page node and
        // becomes Null; annotation and field parents are copied.
        for (key, value) in dict.iter() {
            out.set(key.clone(), self.copy_object(target, value));
        }
        out
    }

    fn copy_object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy_object(target, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.copy_dictionary(target, &stream.dict);
                Object::Stream(copied)
            }
            Object::Reference(id) => self.copy_reference(target, *id),
            other => other.clone(),
        }
    }

    fn copy_reference(&mut self, target: &mut Document, id: ObjectId) -> Object {
        if let Some(mapped) = self.remap.get(&id) {
            return Object::Reference(*mapped);
        }
        let Ok(referenced) = self.source.get_object(id) else {
            debug!(?id, "Cannot resolve reference, using Null");
            return Object::Null;
        };
        if is_page_node(referenced) {
            // A page outside the plan; do not pull it in.
            return Object::Null;
        }

        // Register before recursing so cycles terminate.
        let new_id = target.new_object_id();
        self.remap.insert(id, new_id);
        let copied = self.copy_object(target, referenced);
        target.objects.insert(new_id, copied);
        Object::Reference(new_id)
    }
}

fn is_page_node(object: &Object) -> bool {
    let Object::Dictionary(dict) = object else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Page") | Ok(b"Pages")
    )
}

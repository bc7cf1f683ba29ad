// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page import: copy pages, and every object they reference, from one document
// into another.

use std::collections::HashMap;

use lopdf::{Dictionary, Object, ObjectId, Stream};
use tracing::{debug, warn};

use blattwerk_core::error::{BlattwerkError, Result};

use super::document::{INHERITABLE_KEYS, PdfDocument, find_inherited};

/// Copies pages out of one source document.
///
/// Objects shared by several imported pages (fonts, images, resource
/// dictionaries) are copied once; later references reuse the first copy.
pub struct PageImporter<'a> {
    source: &'a PdfDocument,
    mapped: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageImporter<'a> {
    pub fn new(source: &'a PdfDocument) -> Self {
        Self {
            source,
            mapped: HashMap::new(),
        }
    }

    /// Append source page `page_number` to the end of `target`'s page tree.
    pub fn import(&mut self, target: &mut PdfDocument, page_number: u32) -> Result<()> {
        let page_id = self.source.require_page(page_number)?;
        let mut page = self
            .source
            .inner
            .get_dictionary(page_id)
            .map_err(|err| BlattwerkError::Pdf(format!("page {} is unreadable: {}", page_number, err)))?
            .clone();

        // Attributes inherited from the source page tree must travel with the page.
        for key in INHERITABLE_KEYS {
            if page.has(key) {
                continue;
            }
            if let Some(value) = find_inherited(&self.source.inner, page_id, key) {
                page.set(key.to_vec(), value.clone());
            }
        }
        page.remove(b"Parent");

        let new_page_id = target.inner.new_object_id();
        self.mapped.insert(page_id, new_page_id);
        let mut copied = self.copy_dictionary(target, &page)?;

        let pages_id = pages_root(target)?;
        copied.set("Parent", pages_id);
        target.inner.objects.insert(new_page_id, Object::Dictionary(copied));

        let pages = target
            .inner
            .get_object_mut(pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| BlattwerkError::Pdf(format!("page tree root is unreadable: {}", err)))?;
        let count = match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => {
                kids.push(Object::Reference(new_page_id));
                kids.len()
            }
            _ => {
                pages.set("Kids", vec![Object::Reference(new_page_id)]);
                1
            }
        };
        pages.set("Count", count as i64);

        debug!(page_number, ?new_page_id, "Imported page");
        Ok(())
    }

    fn copy(&mut self, target: &mut PdfDocument, object: &Object) -> Result<Object> {
        Ok(match object {
            Object::Reference(id) => Object::Reference(self.copy_reference(target, *id)?),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(target, dict)?),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy(target, item))
                    .collect::<Result<_>>()?,
            ),
            Object::Stream(stream) => {
                // Content stays in its stored (possibly compressed) form.
                let mut copied: Stream = stream.clone();
                copied.dict = self.copy_dictionary(target, &stream.dict)?;
                Object::Stream(copied)
            }
            other => other.clone(),
        })
    }

    fn copy_dictionary(&mut self, target: &mut PdfDocument, dict: &Dictionary) -> Result<Dictionary> {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            // /Parent would drag the whole source page tree along.
            if key.as_slice() == b"Parent" {
                continue;
            }
            copied.set(key.clone(), self.copy(target, value)?);
        }
        Ok(copied)
    }

    /// Map a source object id to its copy, copying it on first sight.
    fn copy_reference(&mut self, target: &mut PdfDocument, id: ObjectId) -> Result<ObjectId> {
        if let Some(mapped) = self.mapped.get(&id) {
            return Ok(*mapped);
        }
        // Reserve the id before descending so cycles resolve to it.
        let new_id = target.inner.new_object_id();
        self.mapped.insert(id, new_id);

        let copied = match self.source.inner.get_object(id) {
            Ok(object) => self.copy(target, object)?,
            Err(err) => {
                warn!(?id, %err, "Dangling reference in source document, writing null");
                Object::Null
            }
        };
        target.inner.objects.insert(new_id, copied);
        Ok(new_id)
    }
}

fn pages_root(document: &PdfDocument) -> Result<ObjectId> {
    document
        .inner
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|err| BlattwerkError::Pdf(format!("document has no page tree: {}", err)))
}

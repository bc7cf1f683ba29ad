// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF document handle: load, inspect, edit, and serialise documents using the
// `lopdf` crate.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, instrument};

use blattwerk_core::error::{BlattwerkError, Result};

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when a page tree carries no /MediaBox at all.
const DEFAULT_MEDIA_BOX: PageBox = PageBox {
    llx: 0.0,
    lly: 0.0,
    urx: 612.0,
    ury: 792.0,
};

/// A page's bounding box in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Geometric centre of the box.
    pub fn center(&self) -> (f32, f32) {
        (
            self.llx + self.width() / 2.0,
            self.lly + self.height() / 2.0,
        )
    }
}

/// Where a page's resource dictionary lives.
enum ResourceLocation {
    /// An indirect dictionary object, edited in place.
    Indirect(ObjectId),
    /// An inline (or inherited, copied) dictionary written back onto the page.
    Inline(Dictionary),
}

/// An open PDF document.
///
/// Wraps `lopdf::Document` and exposes the page-level operations the
/// composer, overlay engine, and conversion pipeline need. Page numbers are
/// 1-based throughout.
pub struct PdfDocument {
    pub(crate) inner: Document,
}

impl PdfDocument {
    // -- Construction ---------------------------------------------------------

    /// Create a document with an empty page tree.
    pub fn empty() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);
        Self { inner: document }
    }

    /// Parse a document from raw bytes.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| BlattwerkError::Pdf(format!("failed to load PDF: {}", err)))?;
        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { inner: document })
    }

    /// Serialise the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.inner
            .save_to(&mut output)
            .map_err(|err| BlattwerkError::Pdf(format!("failed to serialise PDF: {}", err)))?;
        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> u32 {
        self.inner.get_pages().len() as u32
    }

    /// Object id of a page, or `None` when `page_number` is out of range.
    pub(crate) fn page_id(&self, page_number: u32) -> Option<ObjectId> {
        self.inner.get_pages().get(&page_number).copied()
    }

    /// Object id of a page, or a validation error naming the bad number.
    pub(crate) fn require_page(&self, page_number: u32) -> Result<ObjectId> {
        self.page_id(page_number).ok_or_else(|| {
            BlattwerkError::validation(format!(
                "Invalid page number {}: document has {} pages",
                page_number,
                self.page_count()
            ))
        })
    }

    /// The page's /MediaBox, following inheritance.
    pub fn page_box(&self, page_number: u32) -> Result<PageBox> {
        let page_id = self.require_page(page_number)?;
        let media_box = self
            .inherited_attribute(page_id, b"MediaBox")
            .and_then(|object| self.resolve(object).as_array().ok())
            .and_then(|array| parse_box(array));
        Ok(media_box.unwrap_or(DEFAULT_MEDIA_BOX))
    }

    /// Text of every page in page order.
    #[instrument(skip(self), fields(pages = self.page_count()))]
    pub fn extract_text(&self) -> Result<String> {
        let page_numbers: Vec<u32> = (1..=self.page_count()).collect();
        if page_numbers.is_empty() {
            return Ok(String::new());
        }
        self.inner
            .extract_text(&page_numbers)
            .map_err(|err| BlattwerkError::Pdf(format!("failed to extract text: {}", err)))
    }

    // -- Editing --------------------------------------------------------------

    /// Remove one page. Later pages shift down by one.
    pub fn remove_page(&mut self, page_number: u32) -> Result<()> {
        self.require_page(page_number)?;
        self.inner.delete_pages(&[page_number]);
        Ok(())
    }

    /// Drop objects no longer reachable from the trailer.
    pub(crate) fn prune(&mut self) {
        let removed = self.inner.prune_objects();
        debug!(removed = removed.len(), "Pruned unreachable objects");
    }

    /// Append drawing operations to a page.
    ///
    /// The page's existing content is bracketed by `q`/`Q` so whatever graphics
    /// state it leaves behind cannot move or recolour the new drawing.
    pub(crate) fn append_content(&mut self, page_id: ObjectId, operations: Vec<Operation>) -> Result<()> {
        let existing = self.page_dict(page_id)?.get(b"Contents").ok().cloned();

        let mut stamped = Vec::with_capacity(operations.len() + 3);
        if existing.is_some() {
            stamped.push(Operation::new("Q", vec![]));
        }
        stamped.push(Operation::new("q", vec![]));
        stamped.extend(operations);
        stamped.push(Operation::new("Q", vec![]));
        let stamp_id = self.add_content_stream(stamped)?;

        let contents = match existing {
            None => Object::Reference(stamp_id),
            Some(previous) => {
                let save_id = self.add_content_stream(vec![Operation::new("q", vec![])])?;
                let mut parts = vec![Object::Reference(save_id)];
                parts.extend(self.flatten_contents(previous));
                parts.push(Object::Reference(stamp_id));
                Object::Array(parts)
            }
        };
        self.page_dict_mut(page_id)?.set("Contents", contents);
        Ok(())
    }

    /// Register `value` under `/Resources/<category>/<name>` for a page.
    pub(crate) fn add_resource(
        &mut self,
        page_id: ObjectId,
        category: &[u8],
        name: &str,
        value: Object,
    ) -> Result<()> {
        let location = self.resources_location(page_id)?;
        let mut resources = match &location {
            ResourceLocation::Indirect(id) => self.dict(*id)?.clone(),
            ResourceLocation::Inline(dict) => dict.clone(),
        };

        // A category held by reference is edited where it lives.
        if let Ok(Object::Reference(category_id)) = resources.get(category) {
            let category_id = *category_id;
            self.dict_mut(category_id)?.set(name, value);
            if let ResourceLocation::Inline(_) = location {
                self.page_dict_mut(page_id)?.set("Resources", resources);
            }
            return Ok(());
        }

        let mut entries = match resources.get(category) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        entries.set(name, value);
        resources.set(category.to_vec(), Object::Dictionary(entries));

        match location {
            ResourceLocation::Indirect(id) => *self.dict_mut(id)? = resources,
            ResourceLocation::Inline(_) => self.page_dict_mut(page_id)?.set("Resources", resources),
        }
        Ok(())
    }

    // -- Helpers --------------------------------------------------------------

    pub(crate) fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.inner.add_object(object)
    }

    fn add_content_stream(&mut self, operations: Vec<Operation>) -> Result<ObjectId> {
        let data = Content { operations }
            .encode()
            .map_err(|err| BlattwerkError::Pdf(format!("failed to encode content stream: {}", err)))?;
        let mut stream = Stream::new(Dictionary::new(), data);
        stream
            .compress()
            .map_err(|err| BlattwerkError::Pdf(format!("failed to compress content stream: {}", err)))?;
        Ok(self.inner.add_object(stream))
    }

    /// Expand /Contents into a list of stream references.
    fn flatten_contents(&self, contents: Object) -> Vec<Object> {
        match contents {
            Object::Array(parts) => parts,
            Object::Reference(id) => match self.inner.get_object(id) {
                Ok(Object::Array(parts)) => parts.clone(),
                _ => vec![Object::Reference(id)],
            },
            other => vec![other],
        }
    }

    fn resources_location(&self, page_id: ObjectId) -> Result<ResourceLocation> {
        match self.page_dict(page_id)?.get(b"Resources") {
            Ok(Object::Reference(id)) if self.dict(*id).is_ok() => {
                return Ok(ResourceLocation::Indirect(*id));
            }
            Ok(Object::Dictionary(dict)) => return Ok(ResourceLocation::Inline(dict.clone())),
            _ => {}
        }
        // Inherited resources are copied onto the page so edits stay local.
        let inherited = self
            .inherited_attribute(page_id, b"Resources")
            .and_then(|object| self.resolve(object).as_dict().ok())
            .cloned()
            .unwrap_or_default();
        Ok(ResourceLocation::Inline(inherited))
    }

    /// Look up `key` on the page, then on each ancestor in the page tree.
    pub(crate) fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        find_inherited(&self.inner, page_id, key)
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.inner.get_object(*id).unwrap_or(object),
            other => other,
        }
    }

    fn dict(&self, id: ObjectId) -> Result<&Dictionary> {
        self.inner
            .get_dictionary(id)
            .map_err(|err| BlattwerkError::Pdf(format!("object {:?} is not a dictionary: {}", id, err)))
    }

    fn dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        self.inner
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| BlattwerkError::Pdf(format!("object {:?} is not a dictionary: {}", id, err)))
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary> {
        self.dict(page_id)
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.dict_mut(page_id)
    }
}

/// Walk from `node_id` up the /Parent chain until `key` is found.
pub(crate) fn find_inherited<'a>(document: &'a Document, node_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(node_id);
    // Bounded so a malformed, cyclic /Parent chain cannot spin forever.
    for _ in 0..64 {
        let dict = document.get_dictionary(current?).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn parse_box(array: &[Object]) -> Option<PageBox> {
    if array.len() != 4 {
        return None;
    }
    let number = |object: &Object| match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    };
    let (x0, y0, x1, y1) = (
        number(&array[0])?,
        number(&array[1])?,
        number(&array[2])?,
        number(&array[3])?,
    );
    Some(PageBox {
        llx: x0.min(x1),
        lly: y0.min(y1),
        urx: x0.max(x1),
        ury: y0.max(y1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{document_with_pages, page_widths};

    #[test]
    fn empty_document_has_no_pages_and_serialises() {
        let mut document = PdfDocument::empty();
        assert_eq!(document.page_count(), 0);
        let bytes = document.to_bytes().unwrap();
        assert_eq!(PdfDocument::from_bytes(&bytes).unwrap().page_count(), 0);
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let err = PdfDocument::from_bytes(b"invalid").err().unwrap();
        assert!(matches!(err, BlattwerkError::Pdf(_)));
    }

    #[test]
    fn page_box_reads_media_box() {
        let document = PdfDocument::from_bytes(&document_with_pages(2)).unwrap();
        let page_box = document.page_box(2).unwrap();
        assert_eq!(page_box.width(), 302.0);
        assert_eq!(page_box.height(), 792.0);
        assert_eq!(page_box.center(), (151.0, 396.0));
    }

    #[test]
    fn out_of_range_page_is_validation_error() {
        let document = PdfDocument::from_bytes(&document_with_pages(2)).unwrap();
        let err = document.page_box(3).unwrap_err();
        assert_eq!(err.kind(), blattwerk_core::ErrorKind::Validation);
        assert!(document.page_box(0).is_err());
    }

    #[test]
    fn remove_page_shifts_later_pages() {
        let mut document = PdfDocument::from_bytes(&document_with_pages(3)).unwrap();
        document.remove_page(2).unwrap();
        let bytes = document.to_bytes().unwrap();
        assert_eq!(page_widths(&bytes), vec![301.0, 303.0]);
    }

    #[test]
    fn append_content_brackets_existing_content() {
        let mut document = PdfDocument::from_bytes(&document_with_pages(1)).unwrap();
        let page_id = document.page_id(1).unwrap();
        document
            .append_content(page_id, vec![Operation::new("re", vec![0.into(), 0.into(), 1.into(), 1.into()])])
            .unwrap();

        let contents = document.page_dict(page_id).unwrap().get(b"Contents").unwrap().clone();
        match contents {
            Object::Array(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected a contents array, got {other:?}"),
        }
    }

    #[test]
    fn add_resource_creates_missing_category() {
        let mut document = PdfDocument::from_bytes(&document_with_pages(1)).unwrap();
        let page_id = document.page_id(1).unwrap();
        let font_id = document.add_object(dictionary! { "Type" => "Font" });
        document
            .add_resource(page_id, b"XObject", "Im1", Object::Reference(font_id))
            .unwrap();
        document
            .add_resource(page_id, b"XObject", "Im2", Object::Reference(font_id))
            .unwrap();

        let resources = match document.resources_location(page_id).unwrap() {
            ResourceLocation::Inline(dict) => dict,
            ResourceLocation::Indirect(id) => document.dict(id).unwrap().clone(),
        };
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.has(b"Im1"));
        assert!(xobjects.has(b"Im2"));
        // The fixture's font survives.
        assert!(resources.has(b"Font"));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document composer: merge, split, extract, and remove pages.
//
// Every function is a pure transformation of input bytes into output bytes;
// persisting the results is the caller's job.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use blattwerk_core::error::{BlattwerkError, Result};

use crate::pdf::{PageImporter, PdfDocument};
use crate::range::{PageRange, parse_groups};

/// One output document of a split.
#[derive(Debug, Clone)]
pub struct SplitPart {
    /// Artifact tag: `page_N` for a per-page split, `part_N` for a grouped one.
    pub tag: String,
    /// Source pages, in output order.
    pub pages: Vec<u32>,
    pub bytes: Vec<u8>,
}

/// Source documents held open for the length of a merge.
///
/// Every source is released when the guard drops, whether the merge finished
/// or bailed out part way.
struct OpenSources {
    documents: Vec<PdfDocument>,
}

impl OpenSources {
    fn open(sources: &[&[u8]]) -> Result<Self> {
        let mut guard = Self {
            documents: Vec::with_capacity(sources.len()),
        };
        for (index, bytes) in sources.iter().enumerate() {
            let document = PdfDocument::from_bytes(bytes).map_err(|err| match err {
                BlattwerkError::Pdf(detail) => BlattwerkError::Pdf(format!("source {}: {}", index + 1, detail)),
                other => other,
            })?;
            guard.documents.push(document);
        }
        Ok(guard)
    }
}

impl Drop for OpenSources {
    fn drop(&mut self) {
        let released = self.documents.drain(..).count();
        debug!(released, "Released merge sources");
    }
}

/// Concatenate every page of every source, in source order.
#[instrument(skip_all, fields(sources = sources.len()))]
pub fn merge(sources: &[&[u8]]) -> Result<Vec<u8>> {
    if sources.is_empty() {
        return Err(BlattwerkError::validation("At least one PDF is required to merge"));
    }

    let opened = OpenSources::open(sources)?;
    let mut merged = PdfDocument::empty();
    for source in &opened.documents {
        let mut importer = PageImporter::new(source);
        for page_number in 1..=source.page_count() {
            importer.import(&mut merged, page_number)?;
        }
    }
    let bytes = merged.to_bytes()?;
    drop(opened);

    info!(pages = merged.page_count(), output_bytes = bytes.len(), "PDFs merged");
    Ok(bytes)
}

/// Split into one document per page, or one per non-empty group of `expression`.
///
/// A blank or missing expression means one document per page. Groups that
/// select no pages produce nothing.
#[instrument(skip(bytes), fields(bytes_len = bytes.len()))]
pub fn split(bytes: &[u8], expression: Option<&str>) -> Result<Vec<SplitPart>> {
    let source = PdfDocument::from_bytes(bytes)?;
    let page_count = source.page_count();

    let expression = expression.map(str::trim).filter(|e| !e.is_empty());
    let (ranges, grouped) = match expression {
        Some(expression) => (parse_groups(expression, page_count)?, true),
        None => (PageRange::each_page(page_count), false),
    };

    let mut parts = Vec::new();
    for range in ranges.iter().filter(|range| !range.is_empty()) {
        let tag = if grouped {
            format!("part_{}", parts.len() + 1)
        } else {
            format!("page_{}", range.pages()[0])
        };
        let bytes = compose_pages(&source, range.pages())?;
        debug!(%tag, pages = range.len(), "Split part composed");
        parts.push(SplitPart {
            tag,
            pages: range.pages().to_vec(),
            bytes,
        });
    }

    if parts.is_empty() {
        return Err(BlattwerkError::validation("no pages selected"));
    }
    info!(parts = parts.len(), "PDF split");
    Ok(parts)
}

/// Copy the requested pages, in the requested order, into a new document.
///
/// Numbers outside the document are skipped.
#[instrument(skip(bytes), fields(bytes_len = bytes.len()))]
pub fn extract(bytes: &[u8], pages: &[u32]) -> Result<Vec<u8>> {
    let source = PdfDocument::from_bytes(bytes)?;
    let page_count = source.page_count();
    let selected: Vec<u32> = pages
        .iter()
        .copied()
        .filter(|page| {
            let in_range = (1..=page_count).contains(page);
            if !in_range {
                warn!(page, page_count, "Skipping page outside document");
            }
            in_range
        })
        .collect();
    compose_pages(&source, &selected)
}

/// Delete the given pages from the document. Numbers outside it are skipped.
#[instrument(skip(bytes), fields(bytes_len = bytes.len()))]
pub fn remove(bytes: &[u8], pages: &[u32]) -> Result<Vec<u8>> {
    let mut document = PdfDocument::from_bytes(bytes)?;
    let page_count = document.page_count();
    let targets: BTreeSet<u32> = pages.iter().copied().collect();

    // Highest first, so earlier deletions never renumber later targets.
    for &page in targets.iter().rev() {
        if (1..=page_count).contains(&page) {
            document.remove_page(page)?;
        } else {
            warn!(page, page_count, "Skipping page outside document");
        }
    }
    document.prune();
    info!(remaining = document.page_count(), "Pages removed");
    document.to_bytes()
}

fn compose_pages(source: &PdfDocument, pages: &[u32]) -> Result<Vec<u8>> {
    let mut output = PdfDocument::empty();
    let mut importer = PageImporter::new(source);
    for &page in pages {
        importer.import(&mut output, page)?;
    }
    output.to_bytes()
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipeline: reflow a document's extracted text into Markdown or a
// WordprocessingML (.docx) package.
//
// Conversion is lossy by nature: only text survives, and structure is guessed
// from blank lines. A document with no extractable text still converts, to a
// fixed placeholder.

pub mod docx;
pub mod markdown;

use tracing::{debug, instrument};

use blattwerk_core::error::Result;

use crate::pdf::PdfDocument;

/// Stands in for the text of a document with none to extract.
pub const NO_TEXT_PLACEHOLDER: &str = "No extractable text was found in this document.";

/// Reading-order text of the document, or the placeholder when there is none.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn document_text(bytes: &[u8]) -> Result<String> {
    let document = PdfDocument::from_bytes(bytes)?;
    let text = document.extract_text()?.replace("\r\n", "\n").replace('\r', "\n");
    if text.trim().is_empty() {
        debug!("No extractable text, using placeholder");
        return Ok(NO_TEXT_PLACEHOLDER.to_string());
    }
    Ok(text)
}

/// Convert a PDF to Markdown.
pub fn pdf_to_markdown(bytes: &[u8]) -> Result<Vec<u8>> {
    let text = document_text(bytes)?;
    Ok(markdown::render(&text).into_bytes())
}

/// Convert a PDF to a .docx package.
pub fn pdf_to_docx(bytes: &[u8]) -> Result<Vec<u8>> {
    let text = document_text(bytes)?;
    docx::DocxWriter::new()
        .paragraphs(docx::split_paragraphs(&text))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{blank_document, document_with_pages};

    #[test]
    fn text_is_extracted_in_page_order() {
        let text = document_text(&document_with_pages(2)).unwrap();
        let first = text.find("Page 1").unwrap();
        let second = text.find("Page 2").unwrap();
        assert!(first < second);
    }

    #[test]
    fn textless_documents_get_the_placeholder() {
        assert_eq!(document_text(&blank_document(2)).unwrap(), NO_TEXT_PLACEHOLDER);
        let markdown = String::from_utf8(pdf_to_markdown(&blank_document(1)).unwrap()).unwrap();
        assert!(markdown.contains(NO_TEXT_PLACEHOLDER));
    }

    #[test]
    fn unreadable_input_fails() {
        assert!(pdf_to_docx(b"%PDF-broken").is_err());
    }
}

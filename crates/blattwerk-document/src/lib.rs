// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-document: Document processing for the Blattwerk engine.
//
// Provides the page-range parser, page composition (merge, split, extract,
// remove), overlay stamping (watermark, text, signature, redaction), and
// text conversion to Markdown and DOCX, all on top of `lopdf`.

pub mod compose;
pub mod convert;
pub mod image;
pub mod overlay;
pub mod pdf;
pub mod range;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export the primary types so callers can use `blattwerk_document::PdfDocument` etc.
pub use compose::SplitPart;
pub use image::SignatureImage;
pub use overlay::BatchOutcome;
pub use pdf::{PageImporter, PdfDocument};
pub use range::{PageRange, parse_groups};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: loading, page import, page drawing, and serialisation.

pub mod content;
pub mod document;
pub mod import;

pub use content::{Fill, Primitive};
pub use document::{PageBox, PdfDocument};
pub use import::PageImporter;

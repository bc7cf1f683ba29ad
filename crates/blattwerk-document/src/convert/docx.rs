// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal WordprocessingML writer: one plain run per paragraph, packaged as a
// .docx zip with `zip`, text escaped with `quick-xml`.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use tracing::debug;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use blattwerk_core::error::{BlattwerkError, Result};

use super::NO_TEXT_PLACEHOLDER;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

const DOCUMENT_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:body>"#,
);

const DOCUMENT_CLOSE: &str = r#"<w:sectPr/></w:body></w:document>"#;

/// Split text on blank-line boundaries into trimmed, non-empty paragraphs.
///
/// Text with no paragraphs at all yields the placeholder paragraph.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let paragraphs: Vec<String> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(str::to_string)
        .collect();
    if paragraphs.is_empty() {
        vec![NO_TEXT_PLACEHOLDER.to_string()]
    } else {
        paragraphs
    }
}

/// Accumulates paragraphs, then writes the package.
#[derive(Debug, Default)]
pub struct DocxWriter {
    body: String,
    paragraphs: usize,
}

impl DocxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one paragraph. Line breaks inside it become `<w:br/>`.
    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str("<w:p><w:r>");
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                self.body.push_str("<w:br/>");
            }
            let line = xml_safe(line);
            self.body.push_str(r#"<w:t xml:space="preserve">"#);
            self.body.push_str(&escape(line.as_str()));
            self.body.push_str("</w:t>");
        }
        self.body.push_str("</w:r></w:p>");
        self.paragraphs += 1;
        self
    }

    pub fn paragraphs<I, S>(self, paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paragraphs
            .into_iter()
            .fold(self, |writer, paragraph| writer.paragraph(paragraph.as_ref()))
    }

    /// Zip the parts into a .docx byte buffer.
    pub fn finish(self) -> Result<Vec<u8>> {
        let document = format!("{DOCUMENT_OPEN}{}{DOCUMENT_CLOSE}", self.body);
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/document.xml", document.as_str()),
        ];

        let mut buffer = Vec::new();
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in parts {
            zip.start_file(name, options)
                .map_err(|err| BlattwerkError::Docx(format!("failed to add {}: {}", name, err)))?;
            zip.write_all(content.as_bytes())?;
        }
        zip.finish()
            .map_err(|err| BlattwerkError::Docx(format!("failed to finish package: {}", err)))?;

        debug!(paragraphs = self.paragraphs, output_bytes = buffer.len(), "DOCX written");
        Ok(buffer)
    }
}

/// Drop characters XML 1.0 cannot carry.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\t' || !c.is_control())
        .collect()
}

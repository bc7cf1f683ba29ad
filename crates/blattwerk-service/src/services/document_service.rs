// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document service: the operation facade.
//
// Calls are independent and share nothing but the artifact directory, so one
// `DocumentService` can serve any number of callers concurrently.

use std::path::Path;

use tracing::{error, info, instrument, warn};

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{
    AppConfig, ArtifactKind, ErrorKind, Operation, OperationResult, Redaction, SignaturePlacement,
    TextStampParams, WatermarkParams,
};
use blattwerk_document::{PdfDocument, compose, convert, overlay};
use blattwerk_store::ArtifactStore;

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// Runs document operations and stores their outputs.
#[derive(Debug, Clone)]
pub struct DocumentService {
    store: ArtifactStore,
    config: AppConfig,
}

impl DocumentService {
    /// Build a service around an explicit configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            store: ArtifactStore::new(&config.artifact_dir),
            config,
        }
    }

    /// Build a service from the data directory's `config.json`, or defaults
    /// rooted in the data directory when there is none.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        info!(path = %dir.display(), "Initialising document service");
        let config = load_config(&dir).with_env_overrides();
        info!(artifact_dir = %config.artifact_dir.display(), "Document service ready");
        Ok(Self::new(config))
    }

    // -- Composition ----------------------------------------------------------

    /// Merge documents in the order given.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn merge(&self, sources: &[&[u8]], original: Option<&str>) -> Result<OperationResult> {
        self.run(Operation::Merge, || {
            for source in sources {
                self.check_size("PDF", source)?;
            }
            let merged = compose::merge(sources)?;
            let name = self.save_pdf(&merged, original, Operation::Merge.artifact_tag())?;
            Ok(OperationResult::produced("PDFs merged successfully", &[name]))
        })
    }

    /// Split per page, or per group of a page-range expression such as `"1-2;3"`.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    pub fn split(&self, bytes: &[u8], expression: Option<&str>, original: Option<&str>) -> Result<OperationResult> {
        self.run(Operation::Split, || {
            self.check_size("PDF", bytes)?;
            let parts = compose::split(bytes, expression)?;
            let names = parts
                .iter()
                .map(|part| self.save_pdf(&part.bytes, original, &part.tag))
                .collect::<Result<Vec<_>>>()?;
            Ok(OperationResult::produced(
                format!("PDF split into {} documents", names.len()),
                &names,
            ))
        })
    }

    /// Copy the listed pages, in the listed order, into a new document.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    pub fn extract_pages(&self, bytes: &[u8], pages: &[u32], original: Option<&str>) -> Result<OperationResult> {
        self.run(Operation::Extract, || {
            self.check_size("PDF", bytes)?;
            let extracted = compose::extract(bytes, pages)?;
            let name = self.save_pdf(&extracted, original, Operation::Extract.artifact_tag())?;
            Ok(OperationResult::produced("Pages extracted successfully", &[name]))
        })
    }

    /// Delete the listed pages.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    pub fn remove_pages(&self, bytes: &[u8], pages: &[u32], original: Option<&str>) -> Result<OperationResult> {
        self.run(Operation::Remove, || {
            self.check_size("PDF", bytes)?;
            let remaining = compose::remove(bytes, pages)?;
            let name = self.save_pdf(&remaining, original, Operation::Remove.artifact_tag())?;
            Ok(OperationResult::produced("Pages removed successfully", &[name]))
        })
    }

    // -- Overlays -------------------------------------------------------------

    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn add_watermark(&self, bytes: &[u8], params: &WatermarkParams, original: Option<&str>) -> Result<OperationResult> {
        self.overlay(Operation::Watermark, bytes, original, "Watermark added successfully", |document| {
            overlay::apply_watermark(document, params, self.config.watermark_font_size)
        })
    }

    #[instrument(skip_all, fields(bytes_len = bytes.len(), page = params.page))]
    pub fn add_text(&self, bytes: &[u8], params: &TextStampParams, original: Option<&str>) -> Result<OperationResult> {
        self.overlay(Operation::AddText, bytes, original, "Text added successfully", |document| {
            overlay::apply_text(document, params)
        })
    }

    #[instrument(skip_all, fields(bytes_len = bytes.len(), image_len = image.len(), page = placement.page))]
    pub fn add_signature(
        &self,
        bytes: &[u8],
        image: &[u8],
        placement: SignaturePlacement,
        original: Option<&str>,
    ) -> Result<OperationResult> {
        self.overlay(Operation::AddSignature, bytes, original, "Signature added successfully", |document| {
            self.check_size("Signature image", image)?;
            overlay::apply_signature(document, image, placement)
        })
    }

    /// Black out one rectangle. A page outside the document is an error.
    #[instrument(skip_all, fields(bytes_len = bytes.len(), page = redaction.page))]
    pub fn redact(&self, bytes: &[u8], redaction: &Redaction, original: Option<&str>) -> Result<OperationResult> {
        self.overlay(Operation::Redact, bytes, original, "Content redacted successfully", |document| {
            overlay::apply_redaction(document, redaction)
        })
    }

    /// Black out many rectangles. Entries on missing pages are skipped and
    /// counted in the message.
    #[instrument(skip_all, fields(bytes_len = bytes.len(), redactions = redactions.len()))]
    pub fn redact_multiple(&self, bytes: &[u8], redactions: &[Redaction], original: Option<&str>) -> Result<OperationResult> {
        self.run(Operation::RedactMultiple, || {
            self.check_size("PDF", bytes)?;
            let mut document = PdfDocument::from_bytes(bytes)?;
            let outcome = overlay::apply_redactions(&mut document, redactions)?;
            let name = self.save_pdf(&document.to_bytes()?, original, Operation::RedactMultiple.artifact_tag())?;
            Ok(OperationResult::produced(
                format!("Applied {} of {} redactions", outcome.applied, outcome.total()),
                &[name],
            ))
        })
    }

    /// [`redact_multiple`](Self::redact_multiple) with the list given as JSON:
    /// `[{"page": 1, "x": 10, "y": 10, "width": 100, "height": 20}, ...]`.
    pub fn redact_multiple_json(&self, bytes: &[u8], json: &str, original: Option<&str>) -> Result<OperationResult> {
        let redactions: Vec<Redaction> = serde_json::from_str(json).map_err(|err| {
            warn!(%err, "Rejected redaction payload");
            BlattwerkError::validation(format!("Invalid redactions payload: {}", err))
        })?;
        self.redact_multiple(bytes, &redactions, original)
    }

    // -- Conversion -----------------------------------------------------------

    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn convert_to_markdown(&self, bytes: &[u8], original: Option<&str>) -> Result<OperationResult> {
        self.run(Operation::ConvertMarkdown, || {
            self.check_size("PDF", bytes)?;
            let markdown = convert::pdf_to_markdown(bytes)?;
            let name = self.save(
                &markdown,
                original,
                Operation::ConvertMarkdown.artifact_tag(),
                ArtifactKind::Markdown,
            )?;
            Ok(OperationResult::produced("PDF converted to Markdown", &[name]))
        })
    }

    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn convert_to_docx(&self, bytes: &[u8], original: Option<&str>) -> Result<OperationResult> {
        self.run(Operation::ConvertDocx, || {
            self.check_size("PDF", bytes)?;
            let docx = convert::pdf_to_docx(bytes)?;
            let name = self.save(&docx, original, Operation::ConvertDocx.artifact_tag(), ArtifactKind::Docx)?;
            Ok(OperationResult::produced("PDF converted to DOCX", &[name]))
        })
    }

    // -- Queries --------------------------------------------------------------

    /// Page count, as `"Pages: N"`. Produces no artifact.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn info(&self, bytes: &[u8]) -> Result<OperationResult> {
        self.run(Operation::Info, || {
            self.check_size("PDF", bytes)?;
            let document = PdfDocument::from_bytes(bytes)?;
            Ok(OperationResult::informational(format!("Pages: {}", document.page_count())))
        })
    }

    /// Bytes of a stored artifact.
    pub fn download(&self, name: &str) -> Result<Vec<u8>> {
        self.run(Operation::Download, || self.store.retrieve(name))
    }

    /// Whether a stored artifact still matches the SHA-256 logged when it was
    /// written.
    pub fn verify(&self, name: &str, expected_sha256: &str) -> Result<bool> {
        self.run(Operation::Verify, || self.store.verify(name, expected_sha256))
    }

    // -- Helpers --------------------------------------------------------------

    /// Load, draw, save: the shape every single-result overlay shares.
    fn overlay<F>(
        &self,
        operation: Operation,
        bytes: &[u8],
        original: Option<&str>,
        message: &str,
        draw: F,
    ) -> Result<OperationResult>
    where
        F: FnOnce(&mut PdfDocument) -> Result<()>,
    {
        self.run(operation, || {
            self.check_size("PDF", bytes)?;
            let mut document = PdfDocument::from_bytes(bytes)?;
            draw(&mut document)?;
            let name = self.save_pdf(&document.to_bytes()?, original, operation.artifact_tag())?;
            Ok(OperationResult::produced(message, &[name]))
        })
    }

    /// Run one operation, attaching its context to any failure.
    fn run<T>(&self, operation: Operation, body: impl FnOnce() -> Result<T>) -> Result<T> {
        body().map_err(|err| {
            let err = err.in_operation(operation);
            match err.kind() {
                ErrorKind::Processing => error!(%operation, error = %err, "Operation failed"),
                _ => warn!(%operation, error = %err, "Operation rejected"),
            }
            err
        })
    }

    fn save_pdf(&self, bytes: &[u8], original: Option<&str>, tag: &str) -> Result<String> {
        self.save(bytes, original, tag, ArtifactKind::Pdf)
    }

    fn save(&self, bytes: &[u8], original: Option<&str>, tag: &str, kind: ArtifactKind) -> Result<String> {
        let artifact = self.store.store(bytes, original, tag, kind)?;
        info!(
            name = %artifact.name,
            size = artifact.size,
            sha256 = %artifact.sha256,
            created_at = %artifact.created_at,
            "Operation output stored"
        );
        Ok(artifact.name)
    }

    fn check_size(&self, what: &str, bytes: &[u8]) -> Result<()> {
        if bytes.len() as u64 > self.config.max_input_bytes {
            return Err(BlattwerkError::validation(format!(
                "{} exceeds the maximum size of {} bytes",
                what, self.config.max_input_bytes
            )));
        }
        Ok(())
    }
}

/// `config.json` from `dir`, or defaults rooted in `dir`.
fn load_config(dir: &Path) -> AppConfig {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        match AppConfig::load(&path) {
            Ok(config) => return config,
            Err(err) => warn!(path = %path.display(), %err, "Ignoring unreadable config"),
        }
    }
    AppConfig {
        artifact_dir: dir.join("artifacts"),
        ..AppConfig::default()
    }
}

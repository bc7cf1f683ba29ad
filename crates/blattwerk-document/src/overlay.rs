// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay engine: watermark, text stamp, signature stamp, and redaction.
//
// Each operation turns its parameters into drawing primitives and hands them to
// the page drawing surface. Single-page operations reject a bad page number;
// batch redaction skips bad entries and reports how many it applied.

use std::collections::BTreeMap;

use tracing::{info, instrument, warn};

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{
    Redaction, Rgb, SignaturePlacement, StandardFont, TextStampParams, WATERMARK_MAX_CHARS,
    WatermarkParams,
};

use crate::image::SignatureImage;
use crate::pdf::{Fill, PdfDocument, Primitive};

/// Points per image pixel when stamping a signature.
pub const SIGNATURE_SCALE: f32 = 0.3;

/// Gray fill level for a watermark opacity: 0.0 gives 255 (white), 1.0 gives 0 (black).
///
/// Out-of-range opacities are clamped first.
pub fn gray_level(opacity: f32) -> u8 {
    let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
    (255.0 * (1.0 - opacity)).floor() as u8
}

/// Stamp the watermark on every page, centred unless overridden per axis.
#[instrument(skip_all, fields(pages = document.page_count(), opacity = params.opacity))]
pub fn apply_watermark(document: &mut PdfDocument, params: &WatermarkParams, font_size: f32) -> Result<()> {
    let text = watermark_text(&params.text)?;
    let fill = Fill::Gray(gray_level(params.opacity));

    for page_number in 1..=document.page_count() {
        let (center_x, center_y) = document.page_box(page_number)?.center();
        let primitive = Primitive::Text {
            text: text.clone(),
            font: StandardFont::HelveticaBold,
            size: font_size,
            fill,
            x: params.x.unwrap_or(center_x),
            y: params.y.unwrap_or(center_y),
            rotation_deg: params.rotation_deg,
        };
        document.draw(page_number, &[primitive])?;
    }
    info!(chars = text.chars().count(), "Watermark applied");
    Ok(())
}

/// Stamp one line of text on a single page.
#[instrument(skip_all, fields(page = params.page, font = %params.font_name))]
pub fn apply_text(document: &mut PdfDocument, params: &TextStampParams) -> Result<()> {
    if params.text.trim().is_empty() {
        return Err(BlattwerkError::validation("Text must not be empty"));
    }
    let primitive = Primitive::Text {
        text: params.text.clone(),
        font: StandardFont::from_name(&params.font_name),
        size: params.font_size,
        fill: Fill::Rgb(Rgb::from_hex(&params.color_hex)),
        x: params.x,
        y: params.y,
        rotation_deg: 0.0,
    };
    document.draw(params.page, &[primitive])
}

/// Place a signature image at native size times [`SIGNATURE_SCALE`].
#[instrument(skip_all, fields(page = placement.page))]
pub fn apply_signature(document: &mut PdfDocument, image_bytes: &[u8], placement: SignaturePlacement) -> Result<()> {
    // Page is checked before decoding so a bad page wins over a bad image.
    document.page_box(placement.page)?;
    let image = SignatureImage::decode(image_bytes)?;
    let (width, height) = image.scaled_size(SIGNATURE_SCALE);
    let primitive = Primitive::Image {
        image,
        x: placement.x,
        y: placement.y,
        width,
        height,
    };
    document.draw(placement.page, &[primitive])
}

/// Fill one black rectangle. A bad page number is an error.
#[instrument(skip_all, fields(page = redaction.page))]
pub fn apply_redaction(document: &mut PdfDocument, redaction: &Redaction) -> Result<()> {
    let page_count = document.page_count();
    let page = redaction_page(redaction, page_count).ok_or_else(|| {
        BlattwerkError::validation(format!(
            "Invalid page number {}: document has {} pages",
            redaction.page, page_count
        ))
    })?;
    document.draw(page, &[redaction_rect(redaction)])
}

/// How a batch redaction went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub skipped: usize,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.applied + self.skipped
    }
}

/// Fill every redaction whose page exists; skip the rest.
#[instrument(skip_all, fields(requested = redactions.len()))]
pub fn apply_redactions(document: &mut PdfDocument, redactions: &[Redaction]) -> Result<BatchOutcome> {
    let page_count = document.page_count();
    let mut by_page: BTreeMap<u32, Vec<Primitive>> = BTreeMap::new();
    let mut skipped = 0;

    for redaction in redactions {
        match redaction_page(redaction, page_count) {
            Some(page) => by_page.entry(page).or_default().push(redaction_rect(redaction)),
            None => {
                warn!(page = redaction.page, page_count, "Skipping redaction on missing page");
                skipped += 1;
            }
        }
    }

    for (page_number, rects) in &by_page {
        document.draw(*page_number, rects)?;
    }

    let outcome = BatchOutcome {
        applied: redactions.len() - skipped,
        skipped,
    };
    info!(applied = outcome.applied, skipped = outcome.skipped, "Batch redaction applied");
    Ok(outcome)
}

fn redaction_page(redaction: &Redaction, page_count: u32) -> Option<u32> {
    u32::try_from(redaction.page)
        .ok()
        .filter(|page| (1..=page_count).contains(page))
}

fn redaction_rect(redaction: &Redaction) -> Primitive {
    Primitive::Rect {
        x: redaction.x,
        y: redaction.y,
        width: redaction.width,
        height: redaction.height,
        fill: Fill::Gray(0),
    }
}

fn watermark_text(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(BlattwerkError::validation("Watermark text must not be empty"));
    }
    Ok(text.chars().take(WATERMARK_MAX_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{document_with_pages, page_width, png_bytes};
    use blattwerk_core::ErrorKind;
    use lopdf::content::Content;

    fn open(pages: u32) -> PdfDocument {
        PdfDocument::from_bytes(&document_with_pages(pages)).unwrap()
    }

    fn reload(document: &mut PdfDocument) -> PdfDocument {
        PdfDocument::from_bytes(&document.to_bytes().unwrap()).unwrap()
    }

    /// Numeric operands of the first `operator` on a page.
    fn operands(document: &PdfDocument, page_number: u32, operator: &str) -> Vec<f32> {
        let page_id = document.page_id(page_number).unwrap();
        let content = document.inner.get_page_content(page_id).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .find(|operation| operation.operator == operator)
            .unwrap_or_else(|| panic!("no {operator} on page {page_number}"))
            .operands
            .iter()
            .map(|operand| operand.as_float().unwrap())
            .collect()
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn opacity_maps_to_gray() {
        assert_eq!(gray_level(1.0), 0);
        assert_eq!(gray_level(0.0), 255);
        assert_eq!(gray_level(0.3), 178);
        assert_eq!(gray_level(7.0), 0);
        assert_eq!(gray_level(-1.0), 255);
    }

    #[test]
    fn long_watermark_is_truncated() {
        let text = watermark_text("ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789").unwrap();
        assert_eq!(text, "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123");
    }

    #[test]
    fn empty_watermark_is_rejected() {
        let err = apply_watermark(&mut open(1), &WatermarkParams::new("  "), 60.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn watermark_lands_on_every_page() {
        let mut document = open(3);
        apply_watermark(&mut document, &WatermarkParams::new("CONFIDENTIAL"), 60.0).unwrap();
        let text = reload(&mut document).extract_text().unwrap();
        assert_eq!(text.matches("CONFIDENTIAL").count(), 3);
    }

    #[test]
    fn watermark_opacity_rotation_and_position_reach_the_page() {
        let mut document = open(2);
        let params = WatermarkParams {
            x: Some(10.0),
            rotation_deg: 90.0,
            opacity: 1.0,
            ..WatermarkParams::new("TOP")
        };
        apply_watermark(&mut document, &params, 60.0).unwrap();

        for page in 1..=2 {
            assert_close(&operands(&document, page, "g"), &[0.0]);
            // Explicit x, centred y on a 792pt-high page.
            assert_close(&operands(&document, page, "Tm"), &[0.0, 1.0, -1.0, 0.0, 10.0, 396.0]);
        }
    }

    #[test]
    fn watermark_defaults_to_the_page_centre() {
        let mut document = open(2);
        let params = WatermarkParams {
            y: Some(100.0),
            rotation_deg: 0.0,
            ..WatermarkParams::new("DRAFT")
        };
        apply_watermark(&mut document, &params, 60.0).unwrap();

        for page in 1..=2 {
            assert_close(&operands(&document, page, "g"), &[f32::from(gray_level(0.3)) / 255.0]);
            let center_x = page_width(page) / 2.0;
            assert_close(&operands(&document, page, "Tm"), &[1.0, 0.0, 0.0, 1.0, center_x, 100.0]);
        }
    }

    #[test]
    fn text_stamp_on_missing_page_is_validation_error() {
        let mut params = TextStampParams::new("Approved");
        params.page = 5;
        let err = apply_text(&mut open(2), &params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn text_stamp_tolerates_unknown_font_and_colour() {
        let mut document = open(1);
        let mut params = TextStampParams::new("Approved");
        params.font_name = "NoSuchFont".into();
        params.color_hex = "not-a-colour".into();
        apply_text(&mut document, &params).unwrap();
        assert!(reload(&mut document).extract_text().unwrap().contains("Approved"));
    }

    #[test]
    fn signature_needs_a_valid_page_and_image() {
        let png = png_bytes(20, 10, 255);
        let placement = SignaturePlacement {
            page: 3,
            ..SignaturePlacement::default()
        };
        let err = apply_signature(&mut open(2), &png, placement).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = apply_signature(&mut open(2), b"nope", SignaturePlacement::default()).unwrap_err();
        assert!(matches!(err, BlattwerkError::Image(_)));

        apply_signature(&mut open(2), &png, SignaturePlacement::default()).unwrap();
    }

    #[test]
    fn single_redaction_on_missing_page_fails() {
        let redaction = Redaction {
            page: 9,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let err = apply_redaction(&mut open(2), &redaction).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        for page in [0, -1] {
            let err = apply_redaction(&mut open(2), &Redaction { page, ..redaction }).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "page {page}");
        }
    }

    #[test]
    fn batch_redaction_skips_missing_pages() {
        let rect = |page| Redaction {
            page,
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 20.0,
        };
        let mut document = open(2);
        let outcome = apply_redactions(
            &mut document,
            &[rect(1), rect(7), rect(2), rect(1), rect(0), rect(-3), rect(i64::from(u32::MAX) + 2)],
        )
        .unwrap();
        assert_eq!(outcome, BatchOutcome { applied: 3, skipped: 4 });
        assert_eq!(outcome.total(), 7);
        assert_eq!(reload(&mut document).page_count(), 2);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signature image: decode an uploaded image (PNG, JPEG, ...) into the colour
// and alpha planes a PDF image XObject needs, using the `image` crate.

use blattwerk_core::error::{BlattwerkError, Result};
use tracing::{debug, instrument};

/// A decoded image ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureImage {
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Packed 8-bit RGB samples, row-major.
    pub rgb: Vec<u8>,
    /// 8-bit alpha samples; `None` when the image is fully opaque.
    pub alpha: Option<Vec<u8>>,
}

impl SignatureImage {
    /// Decode encoded image bytes. The format is sniffed from the data.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(data)
            .map_err(|err| BlattwerkError::Image(format!("failed to decode image: {}", err)))?;
        let has_alpha = decoded.color().has_alpha();
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels = rgba.into_raw();
        let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
        let mut alpha = Vec::with_capacity(pixels.len() / 4);
        for pixel in pixels.chunks_exact(4) {
            rgb.extend_from_slice(&pixel[..3]);
            alpha.push(pixel[3]);
        }
        let alpha = (has_alpha && alpha.iter().any(|&a| a != u8::MAX)).then_some(alpha);

        debug!(width, height, soft_mask = alpha.is_some(), "Signature image decoded");
        Ok(Self {
            width,
            height,
            rgb,
            alpha,
        })
    }

    /// Size on the page when drawn at `scale` points per pixel.
    pub fn scaled_size(&self, scale: f32) -> (f32, f32) {
        (self.width as f32 * scale, self.height as f32 * scale)
    }
}

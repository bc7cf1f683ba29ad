// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Drawing surface: turn text, rectangle, and image primitives into content
// stream operations and the resources they reference.

use std::collections::HashSet;

use lopdf::content::Operation;
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, instrument};

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{Rgb, StandardFont};

use super::document::PdfDocument;
use crate::image::SignatureImage;

/// Non-stroking fill colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    /// 0 is black, 255 is white.
    Gray(u8),
    Rgb(Rgb),
}

/// One thing to draw on a page, in PDF user-space units.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Text {
        text: String,
        font: StandardFont,
        size: f32,
        fill: Fill,
        x: f32,
        y: f32,
        /// Counter-clockwise rotation about (x, y).
        rotation_deg: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Fill,
    },
    Image {
        image: SignatureImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl PdfDocument {
    /// Draw `primitives` on top of page `page_number`.
    #[instrument(skip(self, primitives), fields(page_number, primitives = primitives.len()))]
    pub fn draw(&mut self, page_number: u32, primitives: &[Primitive]) -> Result<()> {
        let page_id = self.require_page(page_number)?;
        let mut operations = Vec::new();
        let mut fonts_added = HashSet::new();

        for primitive in primitives {
            match primitive {
                Primitive::Text {
                    text,
                    font,
                    size,
                    fill,
                    x,
                    y,
                    rotation_deg,
                } => {
                    let resource = font_resource_name(*font);
                    if fonts_added.insert(*font) {
                        let font_id = self.add_object(font_dictionary(*font));
                        self.add_resource(page_id, b"Font", &resource, Object::Reference(font_id))?;
                    }
                    let (sin, cos) = rotation_deg.to_radians().sin_cos();
                    operations.push(fill_operation(*fill));
                    operations.push(Operation::new("BT", vec![]));
                    operations.push(Operation::new(
                        "Tf",
                        vec![Object::Name(resource.into_bytes()), Object::Real(*size)],
                    ));
                    operations.push(Operation::new(
                        "Tm",
                        vec![
                            Object::Real(cos),
                            Object::Real(sin),
                            Object::Real(-sin),
                            Object::Real(cos),
                            Object::Real(*x),
                            Object::Real(*y),
                        ],
                    ));
                    operations.push(Operation::new(
                        "Tj",
                        vec![Object::String(encode_text(text, *font), StringFormat::Literal)],
                    ));
                    operations.push(Operation::new("ET", vec![]));
                }
                Primitive::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                } => {
                    operations.push(fill_operation(*fill));
                    operations.push(Operation::new(
                        "re",
                        vec![
                            Object::Real(*x),
                            Object::Real(*y),
                            Object::Real(*width),
                            Object::Real(*height),
                        ],
                    ));
                    operations.push(Operation::new("f", vec![]));
                }
                Primitive::Image {
                    image,
                    x,
                    y,
                    width,
                    height,
                } => {
                    let image_id = self.add_image(image)?;
                    let resource = format!("BwIm{}", image_id.0);
                    self.add_resource(page_id, b"XObject", &resource, Object::Reference(image_id))?;
                    operations.push(Operation::new("q", vec![]));
                    operations.push(Operation::new(
                        "cm",
                        vec![
                            Object::Real(*width),
                            0.into(),
                            0.into(),
                            Object::Real(*height),
                            Object::Real(*x),
                            Object::Real(*y),
                        ],
                    ));
                    operations.push(Operation::new("Do", vec![Object::Name(resource.into_bytes())]));
                    operations.push(Operation::new("Q", vec![]));
                }
            }
        }

        debug!(operations = operations.len(), "Appending overlay content");
        self.append_content(page_id, operations)
    }

    /// Embed an image as an RGB XObject, with its alpha channel as a soft mask.
    fn add_image(&mut self, image: &SignatureImage) -> Result<ObjectId> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        if let Some(alpha) = &image.alpha {
            let mask = compressed_stream(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(image.width),
                    "Height" => i64::from(image.height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha.clone(),
            )?;
            let mask_id = self.add_object(mask);
            dict.set("SMask", mask_id);
        }
        let stream = compressed_stream(dict, image.rgb.clone())?;
        Ok(self.add_object(stream))
    }
}

fn compressed_stream(dict: Dictionary, content: Vec<u8>) -> Result<Stream> {
    let mut stream = Stream::new(dict, content);
    stream
        .compress()
        .map_err(|err| BlattwerkError::Pdf(format!("failed to compress image stream: {}", err)))?;
    Ok(stream)
}

fn fill_operation(fill: Fill) -> Operation {
    match fill {
        Fill::Gray(level) => Operation::new("g", vec![Object::Real(f32::from(level) / 255.0)]),
        Fill::Rgb(color) => {
            let (r, g, b) = color.as_unit();
            Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)])
        }
    }
}

fn font_resource_name(font: StandardFont) -> String {
    format!("Bw{}", font.base_font().replace('-', ""))
}

fn font_dictionary(font: StandardFont) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
    };
    if !font.is_symbolic() {
        dict.set("Encoding", "WinAnsiEncoding");
    }
    dict
}

/// Single-byte encoding for a standard font. Characters it cannot show become `?`.
fn encode_text(text: &str, font: StandardFont) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code if font.is_symbolic() && code <= 0xFF => code as u8,
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

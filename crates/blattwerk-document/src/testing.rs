// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic fixtures for tests and benchmarks.
//
// Page `k` of every generated document is `300 + k` points wide, so page order
// survives any round trip and can be read back with `page_widths`.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::pdf::PdfDocument;

/// Width of page `k` in a generated document.
pub fn page_width(page_number: u32) -> f32 {
    300.0 + page_number as f32
}

/// An N-page PDF whose page `k` shows the text "Page k".
pub fn document_with_pages(page_count: u32) -> Vec<u8> {
    build(page_count, true)
}

/// An N-page PDF with no text on any page.
pub fn blank_document(page_count: u32) -> Vec<u8> {
    build(page_count, false)
}

/// Page widths of a serialised PDF, in page order.
pub fn page_widths(bytes: &[u8]) -> Vec<f32> {
    let document = PdfDocument::from_bytes(bytes).expect("fixture output should load");
    (1..=document.page_count())
        .map(|page| {
            document
                .page_box(page)
                .expect("page within range")
                .width()
        })
        .collect()
}

/// A solid-colour PNG with the given alpha on every pixel.
pub fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([20, 40, 200, alpha]));
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("PNG encoding into memory");
    out
}

fn build(page_count: u32, with_text: bool) -> Vec<u8> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for page_number in 1..=page_count {
        let operations = if with_text {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![40.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {}", page_number))]),
                Operation::new("ET", vec![]),
            ]
        } else {
            Vec::new()
        };
        let content = Content { operations }
            .encode()
            .expect("fixture content encodes");
        let content_id = document.add_object(Stream::new(dictionary! {}, content));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(page_width(page_number)), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    document.save_to(&mut out).expect("fixture PDF serialises");
    out
}

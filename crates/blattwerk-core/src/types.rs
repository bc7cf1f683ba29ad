// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Blattwerk document engine.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Every transformation the engine performs, plus the read-only queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Merge,
    Split,
    Extract,
    Remove,
    Watermark,
    AddText,
    AddSignature,
    Redact,
    RedactMultiple,
    ConvertMarkdown,
    ConvertDocx,
    Info,
    Download,
    Verify,
}

impl Operation {
    /// Tag embedded in artifact names produced by this operation.
    ///
    /// Split derives per-output tags (`page_N`, `part_N`) instead.
    pub fn artifact_tag(&self) -> &'static str {
        match self {
            Self::Merge => "merged",
            Self::Split => "split",
            Self::Extract => "extracted",
            Self::Remove => "removed_pages",
            Self::Watermark => "watermarked",
            Self::AddText => "text_added",
            Self::AddSignature => "signed",
            Self::Redact | Self::RedactMultiple => "redacted",
            Self::ConvertMarkdown | Self::ConvertDocx => "converted",
            Self::Info => "info",
            Self::Download => "download",
            Self::Verify => "verify",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phrase = match self {
            Self::Merge => "merge PDFs",
            Self::Split => "split PDF",
            Self::Extract => "extract pages",
            Self::Remove => "remove pages",
            Self::Watermark => "add watermark",
            Self::AddText => "add text",
            Self::AddSignature => "add signature",
            Self::Redact | Self::RedactMultiple => "redact content",
            Self::ConvertMarkdown => "convert to Markdown",
            Self::ConvertDocx => "convert to DOCX",
            Self::Info => "get PDF info",
            Self::Download => "download file",
            Self::Verify => "verify file",
        };
        f.write_str(phrase)
    }
}

/// Output formats an artifact may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Pdf,
    Markdown,
    Docx,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Pdf, Self::Markdown, Self::Docx];

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "md",
            Self::Docx => "docx",
        }
    }

    /// Infer the kind from a stored filename. Extensions are case-sensitive.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }
}

/// Outcome of one operation, as handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    /// Comma-joined artifact names; `None` for read-only queries.
    pub output_reference: Option<String>,
}

impl OperationResult {
    /// A successful transformation that produced the named artifacts.
    pub fn produced<S: AsRef<str>>(message: impl Into<String>, artifact_names: &[S]) -> Self {
        let joined = artifact_names
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            success: true,
            message: message.into(),
            output_reference: Some(joined),
        }
    }

    /// A successful read-only query.
    pub fn informational(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output_reference: None,
        }
    }

    /// Artifact names split back out of `output_reference`.
    pub fn artifact_names(&self) -> Vec<&str> {
        self.output_reference
            .as_deref()
            .map(|joined| joined.split(',').filter(|n| !n.is_empty()).collect())
            .unwrap_or_default()
    }
}

// -- Overlay parameters -------------------------------------------------------

/// One opaque rectangle to fill on a 1-based page.
///
/// Pages below 1 still decode; the overlay treats them as missing pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Redaction {
    pub page: i64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Longest watermark text kept; longer input is truncated.
pub const WATERMARK_MAX_CHARS: usize = 30;

/// Full-document watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkParams {
    pub text: String,
    /// Overrides the page-centre x coordinate when set.
    pub x: Option<f32>,
    /// Overrides the page-centre y coordinate when set.
    pub y: Option<f32>,
    pub rotation_deg: f32,
    /// 0.0 is invisible, 1.0 is black.
    pub opacity: f32,
}

impl WatermarkParams {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: None,
            y: None,
            rotation_deg: 45.0,
            opacity: 0.3,
        }
    }
}

/// Text annotation stamped onto one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStampParams {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub page: u32,
    pub font_size: f32,
    pub font_name: String,
    pub color_hex: String,
}

impl TextStampParams {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: 50.0,
            y: 750.0,
            page: 1,
            font_size: 12.0,
            font_name: "HELVETICA".into(),
            color_hex: "#000000".into(),
        }
    }
}

/// Signature image placement. The image itself travels separately as bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignaturePlacement {
    pub x: f32,
    pub y: f32,
    pub page: u32,
}

impl Default for SignaturePlacement {
    fn default() -> Self {
        Self {
            x: 400.0,
            y: 100.0,
            page: 1,
        }
    }
}

// -- Fonts and colours --------------------------------------------------------

/// The fourteen standard PDF fonts every viewer must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl StandardFont {
    /// Resolve a caller-supplied font name.
    ///
    /// Accepts the canonical names (`HELVETICA_BOLD`, `Times-Roman`, ...) in any
    /// case with `_`, `-`, or spaces as separators, then a table of common
    /// aliases. Anything else falls back to Helvetica.
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_uppercase)
            .collect();

        match key.as_str() {
            "HELVETICA" => Self::Helvetica,
            "HELVETICABOLD" => Self::HelveticaBold,
            "HELVETICAOBLIQUE" => Self::HelveticaOblique,
            "HELVETICABOLDOBLIQUE" => Self::HelveticaBoldOblique,
            "TIMESROMAN" => Self::TimesRoman,
            "TIMESBOLD" => Self::TimesBold,
            "TIMESITALIC" => Self::TimesItalic,
            "TIMESBOLDITALIC" => Self::TimesBoldItalic,
            "COURIER" => Self::Courier,
            "COURIERBOLD" => Self::CourierBold,
            "COURIEROBLIQUE" => Self::CourierOblique,
            "COURIERBOLDOBLIQUE" => Self::CourierBoldOblique,
            "SYMBOL" => Self::Symbol,
            "ZAPFDINGBATS" => Self::ZapfDingbats,
            // Aliases
            "TIMES" | "TIMESNEWROMAN" | "SERIF" => Self::TimesRoman,
            "ARIAL" | "SANS" | "SANSSERIF" => Self::Helvetica,
            "ARIALBOLD" => Self::HelveticaBold,
            "COURIERNEW" | "MONO" | "MONOSPACE" => Self::Courier,
            _ => {
                debug!(font_name = name, "Unknown font name, using Helvetica");
                Self::Helvetica
            }
        }
    }

    /// PostScript name written to the font dictionary's /BaseFont.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::Symbol => "Symbol",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbol and ZapfDingbats carry their own built-in encodings.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbol | Self::ZapfDingbats)
    }
}

/// An RGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Parse `#RRGGBB`, `RRGGBB`, `#RGB`, or `RGB`. Malformed input yields black.
    pub fn from_hex(input: &str) -> Self {
        Self::try_from_hex(input).unwrap_or_else(|| {
            debug!(color = input, "Unparseable colour, using black");
            Self::BLACK
        })
    }

    fn try_from_hex(input: &str) -> Option<Self> {
        let hex = input.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => Some(Self {
                r: u8::from_str_radix(&hex[0..2], 16).ok()?,
                g: u8::from_str_radix(&hex[2..4], 16).ok()?,
                b: u8::from_str_radix(&hex[4..6], 16).ok()?,
            }),
            3 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
                Some(Self {
                    r: channel(0)?,
                    g: channel(1)?,
                    b: channel(2)?,
                })
            }
            _ => None,
        }
    }

    /// Channels scaled to the 0.0–1.0 range PDF colour operators expect.
    pub fn as_unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact names: generation of collision-resistant output names and
// validation of caller-supplied names before any filesystem access.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use blattwerk_core::ArtifactKind;
use blattwerk_core::error::{BlattwerkError, Result};

/// Alphanumeric at both ends, `.`, `-` and `_` allowed inside, known extension.
static STORED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?\.(?:pdf|md|docx)$")
        .expect("stored-name pattern is valid")
});

/// Longest base kept from a caller's original filename.
const MAX_BASE_CHARS: usize = 100;

/// Length of the random disambiguating suffix.
const SUFFIX_LEN: usize = 8;

/// Build `<base>_<tag>_<suffix>.<ext>` for a new artifact.
///
/// `base` comes from the sanitised original filename; without one the name
/// is just `<tag>_<suffix>.<ext>`.
pub fn artifact_name(original: Option<&str>, tag: &str, kind: ArtifactKind) -> String {
    let suffix = &Uuid::new_v4().simple().to_string()[..SUFFIX_LEN];
    match original.and_then(sanitize_base) {
        Some(base) => format!("{}_{}_{}.{}", base, tag, suffix, kind.extension()),
        None => format!("{}_{}.{}", tag, suffix, kind.extension()),
    }
}

/// Reduce an uploaded filename to a safe name stem.
///
/// Directory components go, a trailing `.pdf` (any case) goes, and every
/// character outside `[A-Za-z0-9_-]` becomes `_`. Returns `None` when nothing
/// usable is left.
pub fn sanitize_base(original: &str) -> Option<String> {
    let file_name = original.rsplit(['/', '\\']).next().unwrap_or(original).trim();
    let stem = match file_name.len().checked_sub(4) {
        Some(cut) if file_name.is_char_boundary(cut) && file_name[cut..].eq_ignore_ascii_case(".pdf") => {
            &file_name[..cut]
        }
        _ => file_name,
    };

    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(MAX_BASE_CHARS)
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '_' || c == '-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Check a caller-supplied name before it touches the filesystem.
///
/// Checks run in a fixed order so the reported reason is stable: empty, null
/// byte, traversal, extension, then the full character pattern.
pub fn validate_filename(name: &str) -> Result<ArtifactKind> {
    if name.trim().is_empty() {
        return Err(invalid("filename is null or empty"));
    }
    if name.contains('\0') {
        return Err(invalid("filename contains a null byte"));
    }
    if name.contains("..") || name.contains(['/', '\\', ':']) {
        return Err(invalid("path traversal attempt detected"));
    }
    let kind = ArtifactKind::from_filename(name)
        .ok_or_else(|| invalid("unsupported file extension (allowed: pdf, md, docx)"))?;
    if !STORED_NAME.is_match(name) {
        return Err(invalid(
            "filename must start and end with an alphanumeric character and contain only alphanumerics, '.', '-' or '_'",
        ));
    }
    Ok(kind)
}

fn invalid(reason: &str) -> BlattwerkError {
    BlattwerkError::validation(format!("Invalid filename: {}", reason))
}

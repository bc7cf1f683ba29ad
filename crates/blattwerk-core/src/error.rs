// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Blattwerk.

use thiserror::Error;

use crate::types::Operation;

/// Top-level error type for all Blattwerk operations.
#[derive(Debug, Error)]
pub enum BlattwerkError {
    // -- Caller-facing kinds --
    #[error("{0}")]
    Validation(String),

    #[error("invalid page range token '{token}'")]
    InvalidPageRange { token: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("failed to {operation}: {detail}")]
    Processing { operation: Operation, detail: String },

    // -- Lower-level failures, wrapped into `Processing` at the operation boundary --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("DOCX generation failed: {0}")]
    Docx(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification that callers translate into status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AccessDenied,
    Processing,
}

impl BlattwerkError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidPageRange { .. } => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::Processing { .. }
            | Self::Pdf(_)
            | Self::Image(_)
            | Self::Docx(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorKind::Processing,
        }
    }

    /// Attach operation context.
    ///
    /// Validation, not-found, and access-denied errors pass through untouched;
    /// everything else becomes a `Processing` error naming `operation`.
    pub fn in_operation(self, operation: Operation) -> Self {
        match self {
            Self::Validation(_)
            | Self::InvalidPageRange { .. }
            | Self::NotFound(_)
            | Self::AccessDenied(_)
            | Self::Processing { .. } => self,
            other => Self::Processing {
                operation,
                detail: other.to_string(),
            },
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BlattwerkError>;

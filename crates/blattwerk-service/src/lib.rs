// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-service: One entry point per document operation.
//
// Each operation checks its inputs, runs the transformation from
// `blattwerk-document`, persists the output through `blattwerk-store`, and
// answers with an `OperationResult`. Lower-level failures come back as
// `Processing` errors naming the operation.

pub mod services;
pub mod telemetry;

pub use services::document_service::DocumentService;

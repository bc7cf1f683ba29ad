// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-store: Artifact storage for the Blattwerk engine.
//
// Generates collision-resistant artifact names, persists operation outputs
// into a single root directory, and serves them back only after filename
// validation and canonical-path confinement. Every stored artifact carries a
// SHA-256 fingerprint.

pub mod integrity;
pub mod naming;
pub mod storage;

pub use integrity::{hash_bytes, matches_hash};
pub use naming::{artifact_name, sanitize_base, validate_filename};
pub use storage::{Artifact, ArtifactStore};

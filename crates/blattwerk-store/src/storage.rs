// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact store: write operation outputs into one flat root directory and
// read them back with path confinement.
//
// Retrieval validates the name lexically, then requires the resolved path to
// sit inside the canonical root. Symlinks pointing outside it are refused,
// dangling ones included.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use blattwerk_core::ArtifactKind;
use blattwerk_core::error::{BlattwerkError, Result};

use crate::integrity::{hash_bytes, matches_hash};
use crate::naming::{artifact_name, validate_filename};

/// A persisted operation output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Stored filename, unique within the root.
    pub name: String,
    pub kind: ArtifactKind,
    /// Size in bytes.
    pub size: u64,
    /// Lowercase hex SHA-256 of the stored bytes.
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

/// One flat directory of artifacts.
///
/// The root is created on first write. No index is kept: an artifact exists
/// exactly when its file does.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Name and persist a new artifact in one step.
    pub fn store(&self, bytes: &[u8], original: Option<&str>, tag: &str, kind: ArtifactKind) -> Result<Artifact> {
        self.persist(bytes, &artifact_name(original, tag, kind))
    }

    /// Write `bytes` under `name`. An existing file is never overwritten.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    pub fn persist(&self, bytes: &[u8], name: &str) -> Result<Artifact> {
        let kind = validate_filename(name)?;
        std::fs::create_dir_all(&self.root)?;

        let path = self.root.join(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(bytes)?;
        file.sync_all()?;

        let artifact = Artifact {
            name: name.to_string(),
            kind,
            size: bytes.len() as u64,
            sha256: hash_bytes(bytes),
            created_at: Utc::now(),
        };
        info!(name, size = artifact.size, "Artifact stored");
        Ok(artifact)
    }

    /// Read an artifact back by name.
    #[instrument(skip(self))]
    pub fn retrieve(&self, name: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve(name)?;
        let bytes = std::fs::read(&resolved)?;
        debug!(name, bytes_len = bytes.len(), "Artifact retrieved");
        Ok(bytes)
    }

    /// Whether the stored artifact still hashes to `expected_sha256`.
    #[instrument(skip(self))]
    pub fn verify(&self, name: &str, expected_sha256: &str) -> Result<bool> {
        let matches = matches_hash(&self.retrieve(name)?, expected_sha256);
        if !matches {
            warn!(name, "Artifact fingerprint mismatch");
        }
        Ok(matches)
    }

    /// Validate `name` and confine it to the canonical root.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        validate_filename(name)?;

        let candidate = self.root.join(name);
        let metadata = match std::fs::symlink_metadata(&candidate) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(name, "Artifact not found");
                return Err(not_found(name));
            }
            Err(err) => return Err(err.into()),
        };

        let root = self.root.canonicalize()?;
        let resolved = match candidate.canonicalize() {
            Ok(resolved) => resolved,
            // Dangling link: confine on where it points, then report it missing.
            Err(err) if err.kind() == io::ErrorKind::NotFound && metadata.file_type().is_symlink() => {
                let target = normalize(&root.join(std::fs::read_link(&candidate)?));
                if !within(&root, &target)? {
                    return Err(access_denied(name, &target));
                }
                return Err(not_found(name));
            }
            Err(err) => return Err(err.into()),
        };

        if !resolved.starts_with(&root) {
            return Err(access_denied(name, &resolved));
        }
        if !resolved.is_file() {
            return Err(not_found(name));
        }
        Ok(resolved)
    }
}

/// Whether `path` lies under `root`, judged by its deepest existing ancestor.
fn within(root: &Path, path: &Path) -> Result<bool> {
    match path.ancestors().find(|ancestor| ancestor.exists()) {
        Some(anchor) => Ok(anchor.canonicalize()?.starts_with(root)),
        None => Ok(false),
    }
}

/// Lexically fold `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn not_found(name: &str) -> BlattwerkError {
    BlattwerkError::NotFound(format!("File not found: {}", name))
}

fn access_denied(name: &str, resolved: &Path) -> BlattwerkError {
    warn!(name, resolved = %resolved.display(), "Artifact resolves outside the store root");
    BlattwerkError::AccessDenied(format!(
        "Access denied: {} is outside the artifact directory",
        name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blattwerk_core::ErrorKind;

    #[test]
    fn persist_creates_root_and_records_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested").join("artifacts"));

        let artifact = store.persist(b"hello", "greeting.md").unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Markdown);
        assert_eq!(artifact.size, 5);
        assert_eq!(artifact.sha256, hash_bytes(b"hello"));
        assert_eq!(store.retrieve("greeting.md").unwrap(), b"hello");
    }

    #[test]
    fn store_generates_retrievable_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let artifact = store
            .store(b"%PDF-1.7", Some("../../in put.pdf"), "merged", ArtifactKind::Pdf)
            .unwrap();
        assert!(artifact.name.starts_with("in_put_merged_"));
        assert_eq!(store.retrieve(&artifact.name).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn persist_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.persist(b"first", "same.pdf").unwrap();
        assert!(store.persist(b"second", "same.pdf").is_err());
        assert_eq!(store.retrieve("same.pdf").unwrap(), b"first");
    }

    #[test]
    fn persist_rejects_unsafe_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store.persist(b"x", "../escape.pdf").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store.retrieve("nonexistent.pdf").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("never-created"));
        assert_eq!(store.retrieve("a.pdf").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn invalid_names_fail_before_filesystem_access() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        for name in ["../etc/passwd", "test.pdf\0.jpg", "test<>.pdf", "malicious.exe", "  "] {
            assert_eq!(store.retrieve(name).unwrap_err().kind(), ErrorKind::Validation, "{name:?}");
        }
    }

    #[test]
    fn valid_name_is_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("valid-file_123.pdf"), b"%PDF").unwrap();
        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.retrieve("valid-file_123.pdf").unwrap(), b"%PDF");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_the_root_is_denied() {
        let outside = tempfile::tempdir().unwrap();
        let secret = outside.path().join("secret.pdf");
        std::fs::write(&secret, b"top secret").unwrap();

        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&secret, root.path().join("innocent.pdf")).unwrap();

        let store = ArtifactStore::new(root.path());
        let err = store.retrieve("innocent.pdf").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_the_root_is_served() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("real.pdf"), b"data").unwrap();
        std::os::unix::fs::symlink(root.path().join("real.pdf"), root.path().join("alias.pdf")).unwrap();

        let store = ArtifactStore::new(root.path());
        assert_eq!(store.retrieve("alias.pdf").unwrap(), b"data");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_out_of_the_root_is_denied() {
        let outside = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("gone.pdf"), root.path().join("gone.pdf")).unwrap();
        std::os::unix::fs::symlink("../elsewhere/x.pdf", root.path().join("relative.pdf")).unwrap();

        let store = ArtifactStore::new(root.path());
        assert_eq!(store.retrieve("gone.pdf").unwrap_err().kind(), ErrorKind::AccessDenied);
        assert_eq!(store.retrieve("relative.pdf").unwrap_err().kind(), ErrorKind::AccessDenied);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_inside_the_root_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(root.path().join("later.pdf"), root.path().join("pending.pdf")).unwrap();

        let store = ArtifactStore::new(root.path());
        assert_eq!(store.retrieve("pending.pdf").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn verify_checks_the_recorded_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let artifact = store.persist(b"%PDF-1.7 body", "checked.pdf").unwrap();

        assert!(store.verify("checked.pdf", &artifact.sha256).unwrap());
        assert!(store.verify("checked.pdf", &artifact.sha256.to_uppercase()).unwrap());

        std::fs::write(dir.path().join("checked.pdf"), b"tampered").unwrap();
        assert!(!store.verify("checked.pdf", &artifact.sha256).unwrap());
        assert_eq!(
            store.verify("absent.pdf", &artifact.sha256).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn normalize_folds_parent_components() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d.pdf")), PathBuf::from("/a/c/d.pdf"));
    }

    #[test]
    fn directories_are_not_artifacts() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("folder.pdf")).unwrap();
        let store = ArtifactStore::new(root.path());
        assert_eq!(store.retrieve("folder.pdf").unwrap_err().kind(), ErrorKind::NotFound);
    }
}

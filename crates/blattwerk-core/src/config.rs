// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Environment variable that overrides [`AppConfig::artifact_dir`].
pub const ARTIFACT_DIR_ENV: &str = "BLATTWERK_ARTIFACT_DIR";

/// Settings shared by every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory for stored artifacts. Created on first write.
    pub artifact_dir: PathBuf,
    /// Largest accepted input document or image, in bytes.
    pub max_input_bytes: u64,
    /// Font size used for watermark text.
    pub watermark_font_size: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("artifacts"),
            max_input_bytes: 100 * 1024 * 1024,
            watermark_font_size: 60.0,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        debug!(path = %path.as_ref().display(), "Loaded config");
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Apply `BLATTWERK_ARTIFACT_DIR` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_artifact_dir_override(std::env::var(ARTIFACT_DIR_ENV).ok())
    }

    fn with_artifact_dir_override(mut self, dir: Option<String>) -> Self {
        if let Some(dir) = dir {
            if !dir.trim().is_empty() {
                self.artifact_dir = PathBuf::from(dir);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"artifact_dir": "/srv/out"}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.artifact_dir, PathBuf::from("/srv/out"));
        assert_eq!(config.max_input_bytes, 100 * 1024 * 1024);
        assert_eq!(config.watermark_font_size, 60.0);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AppConfig {
            artifact_dir: dir.path().join("out"),
            max_input_bytes: 1024,
            watermark_font_size: 48.0,
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn artifact_dir_override_ignores_blank_values() {
        let base = AppConfig::default();
        let overridden = base.clone().with_artifact_dir_override(Some("/srv/blattwerk".into()));
        assert_eq!(overridden.artifact_dir, PathBuf::from("/srv/blattwerk"));
        assert_eq!(base.clone().with_artifact_dir_override(Some("   ".into())), base);
        assert_eq!(base.clone().with_artifact_dir_override(None), base);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::ffi::OsString;
use std::path::PathBuf;

use blattwerk_core::error::Result;

/// Name of the application directory inside the platform data directory.
const APP_DIR: &str = "blattwerk";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> Result<PathBuf> {
    let dir = resolve_base(std::env::var_os("XDG_DATA_HOME"), std::env::var_os("HOME")).join(APP_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `$XDG_DATA_HOME`, then `$HOME/.local/share`, then the system temp dir.
/// Unset and empty variables are treated alike.
fn resolve_base(xdg_data_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let non_empty = |value: Option<OsString>| value.filter(|v| !v.is_empty());
    if let Some(xdg) = non_empty(xdg_data_home) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = non_empty(home) {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}

//! Configuration and top directory discovery.

use crate::config::schema::MachConfig;
use crate::error::{MachError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, relative to the top directory.
pub const CONFIG_FILE_NAME: &str = ".mach.yml";

/// Find the top directory by walking up from `start`.
///
/// Looks for:
/// 1. `.python-version` (the checkout root pins its interpreter there)
/// 2. `.git` directory (fallback)
///
/// # Returns
///
/// The path to the top directory, or None if not found.
pub fn find_topdir(start: &Path) -> Option<PathBuf> {
    find_upwards(start, ".python-version").or_else(|| find_upwards(start, ".git"))
}

fn find_upwards(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(marker).exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<MachConfig> {
    let content = fs::read_to_string(path)?;

    if content.trim().is_empty() {
        return Ok(MachConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|e| MachError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the configuration for a top directory.
///
/// An explicit path must exist. Without one, `<topdir>/.mach.yml` is used
/// when present and the defaults otherwise.
pub fn load_config(topdir: &Path, explicit: Option<&Path>) -> Result<MachConfig> {
    if let Some(path) = explicit {
        tracing::debug!("Loading config from {}", path.display());
        return load_config_file(path);
    }

    let path = topdir.join(CONFIG_FILE_NAME);
    if path.is_file() {
        tracing::debug!("Loading config from {}", path.display());
        load_config_file(&path)
    } else {
        tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, topdir.display());
        Ok(MachConfig::default())
    }
}

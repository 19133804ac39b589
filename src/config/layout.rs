//! Filesystem layout of a checkout.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::MachConfig;
use crate::environment::ProcessEnv;
use crate::error::{MachError, Result};

/// Resolved paths derived from the top directory and configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Checkout root.
    pub topdir: PathBuf,

    /// Python virtual environment directory.
    pub venv_dir: PathBuf,

    /// File pinning the interpreter version.
    pub python_version_file: PathBuf,

    /// Requirement files, absolute, in hashing order.
    pub requirements: Vec<PathBuf>,

    /// Cargo target directory.
    pub target_dir: PathBuf,

    /// Root for downloaded platform dependencies.
    pub dependencies_dir: PathBuf,
}

impl ProjectLayout {
    /// Resolve the layout for `topdir`.
    ///
    /// The target directory honours `CARGO_TARGET_DIR` (made absolute
    /// against `topdir` when relative).
    pub fn resolve(topdir: &Path, config: &MachConfig, env: &dyn ProcessEnv) -> Self {
        let target_dir = match env.get("CARGO_TARGET_DIR") {
            Some(dir) if !dir.is_empty() => topdir.join(dir),
            _ => topdir.join("target"),
        };

        Self {
            topdir: topdir.to_path_buf(),
            venv_dir: topdir.join(&config.virtualenv.directory),
            python_version_file: topdir.join(".python-version"),
            requirements: config
                .virtualenv
                .requirements
                .iter()
                .map(|r| topdir.join(r))
                .collect(),
            dependencies_dir: target_dir.join("dependencies"),
            target_dir,
        }
    }

    /// Read the pinned interpreter version.
    pub fn python_version(&self) -> Result<String> {
        let content = fs::read_to_string(&self.python_version_file).map_err(|_| {
            MachError::PythonVersionMissing {
                path: self.python_version_file.clone(),
            }
        })?;
        let version = content.trim();
        if version.is_empty() {
            return Err(MachError::PythonVersionMissing {
                path: self.python_version_file.clone(),
            });
        }
        Ok(version.to_string())
    }
}

/// Reject top directories mach cannot work in.
///
/// On Windows the checkout must be on a case-insensitive file system: the
/// `python` directory is probed with the wrong case. Elsewhere, paths with
/// spaces are rejected.
pub fn check_topdir(topdir: &Path, is_windows: bool) -> Result<()> {
    if is_windows {
        if !topdir.join("Python").exists() {
            return Err(MachError::CaseSensitiveFilesystem);
        }
    } else if topdir.to_string_lossy().contains(' ') {
        return Err(MachError::PathContainsSpaces {
            path: topdir.to_path_buf(),
        });
    }
    Ok(())
}

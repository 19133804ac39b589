//! Error types for mach operations.
//!
//! This module defines [`MachError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `MachError` for failures the binary reports in a specific way
//!   (captured subprocess output, unsupported platforms)
//! - Use `anyhow::Error` (via `MachError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::ExtractionError;

/// Core error type for mach operations.
#[derive(Debug, Error)]
pub enum MachError {
    /// A subprocess exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        /// Captured stdout followed by stderr.
        output: String,
    },

    /// A downloaded archive failed validation on every attempt.
    #[error("{archive} is not a valid zip file (gave up after {attempts} attempts)")]
    CorruptArchive { archive: PathBuf, attempts: u32 },

    /// Archive extraction failed for a reason other than corruption.
    #[error(transparent)]
    Extraction(ExtractionError),

    /// A download could not be completed.
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// The requested operation is not available on this host.
    #[error("{message}")]
    UnsupportedPlatform { message: String },

    /// An installer ran but its result could not be detected afterwards.
    #[error("{what} is still not detected after installation")]
    PostInstallCheckFailed { what: String },

    /// A requirements file could not be read while fingerprinting.
    #[error("Failed to read requirements file {path}: {source}")]
    RequirementsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The interpreter version file is missing or unreadable.
    #[error("Could not read the required Python version from {path}")]
    PythonVersionMissing { path: PathBuf },

    /// The checkout lives on a case-sensitive file system on Windows.
    #[error("Cannot run mach in a path on a case-sensitive file system on Windows.")]
    CaseSensitiveFilesystem,

    /// The checkout path contains spaces.
    #[error("Cannot run mach in a path with spaces. Current path: {path}")]
    PathContainsSpaces { path: PathBuf },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A category was defined twice.
    #[error("Category '{name}' is already defined")]
    DuplicateCategory { name: String },

    /// Two command modules provide the same command name.
    #[error("Command '{name}' is already registered by module '{module}'")]
    DuplicateCommand { name: String, module: String },

    /// A command refers to a category that was never defined.
    #[error("Command '{command}' uses undefined category '{category}'")]
    UnknownCategory { command: String, category: String },

    /// The context handler was asked for a key it does not provide.
    #[error("Unknown context key: {key}")]
    UnknownContextKey { key: String },

    /// The command exists but cannot run in the current context.
    #[error("Command '{name}' is unavailable for your current context: {reason}")]
    CommandUnavailable { name: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for mach operations.
pub type Result<T> = std::result::Result<T, MachError>;

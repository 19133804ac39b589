//! mach - bootstrap and command dispatch for a large Rust checkout.
//!
//! mach prepares a development environment (a Python virtual environment
//! with pinned requirements, prebuilt platform dependencies, system packages
//! and lint tools) and dispatches categorized subcommands.
//!
//! # Modules
//!
//! - [`cli`] - Command registry, categories and command implementations
//! - [`config`] - `.mach.yml` loading and the checkout layout
//! - [`environment`] - Environment variable access and virtualenv activation
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - HTTP downloads and zip extraction
//! - [`platform`] - Per-platform dependency bootstrapping
//! - [`requirements`] - Fingerprint-gated requirement installation
//! - [`shell`] - Subprocess execution
//! - [`ui`] - Spinners, progress and terminal output
//!
//! # Example
//!
//! ```
//! use mach::requirements::RequirementsFingerprint;
//! use std::fs;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let a = dir.path().join("a.txt");
//! let b = dir.path().join("b.txt");
//! fs::write(&a, "x").unwrap();
//! fs::write(&b, "y").unwrap();
//!
//! let before = RequirementsFingerprint::compute(&[a.clone(), b.clone()]).unwrap();
//! fs::write(&b, "z").unwrap();
//! let after = RequirementsFingerprint::compute(&[a, b]).unwrap();
//! assert_ne!(before, after);
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod fetch;
pub mod platform;
pub mod requirements;
pub mod shell;
pub mod ui;

pub use error::{MachError, Result};

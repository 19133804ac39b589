//! Python requirement fingerprinting and installation.
//!
//! The requirement files are hashed together; `uv pip install` only runs
//! when the hash differs from the marker written after the last install.

pub mod fingerprint;
pub mod installer;

pub use fingerprint::{read_marker, write_marker, RequirementsFingerprint};
pub use installer::RequirementsInstaller;

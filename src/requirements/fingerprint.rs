//! Requirement fingerprints and their marker files.
//!
//! A fingerprint is the SHA-256 of the concatenated bytes of an ordered list
//! of requirement files. The marker file stores the fingerprint of the last
//! successful install; any difference means the requirements changed.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{MachError, Result};

/// Hex-encoded SHA-256 over a set of requirement files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementsFingerprint(String);

impl RequirementsFingerprint {
    /// Hash the files in order.
    ///
    /// File order matters: the digest is over the concatenation, so the same
    /// files in a different order produce a different fingerprint.
    pub fn compute(paths: &[PathBuf]) -> Result<Self> {
        let mut hasher = Sha256::new();
        for path in paths {
            let content = fs::read(path).map_err(|source| MachError::RequirementsUnreadable {
                path: path.clone(),
                source,
            })?;
            hasher.update(&content);
        }
        let digest = hasher.finalize();
        Ok(Self(hex::encode(&digest[..])))
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `marker` holds this fingerprint.
    pub fn matches(&self, marker: Option<&str>) -> bool {
        marker == Some(self.0.as_str())
    }
}

impl fmt::Display for RequirementsFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read a marker file. A missing file is `None`.
pub fn read_marker(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Persist `fingerprint` as the whole content of the marker file.
pub fn write_marker(path: &Path, fingerprint: &RequirementsFingerprint) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, fingerprint.as_str())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
        files
            .iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn digest_is_over_concatenated_contents() {
        let temp = TempDir::new().unwrap();
        let paths = write_files(temp.path(), &[("a.txt", "x"), ("b.txt", "y")]);

        let fingerprint = RequirementsFingerprint::compute(&paths).unwrap();

        let expected = hex::encode(&Sha256::digest(b"xy")[..]);
        assert_eq!(fingerprint.as_str(), expected);
        assert_eq!(fingerprint.as_str().len(), 64);
    }

    #[test]
    fn digest_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let paths = write_files(temp.path(), &[("a.txt", "x"), ("b.txt", "y")]);

        let first = RequirementsFingerprint::compute(&paths).unwrap();
        let second = RequirementsFingerprint::compute(&paths).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn changing_one_file_changes_digest() {
        let temp = TempDir::new().unwrap();
        let paths = write_files(temp.path(), &[("a.txt", "x"), ("b.txt", "y")]);
        let d1 = RequirementsFingerprint::compute(&paths).unwrap();

        fs::write(&paths[1], "z").unwrap();
        let d2 = RequirementsFingerprint::compute(&paths).unwrap();

        assert_ne!(d1, d2);
    }

    #[test]
    fn missing_file_names_the_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.txt");

        let err = RequirementsFingerprint::compute(&[missing.clone()]).unwrap_err();

        match err {
            MachError::RequirementsUnreadable { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn marker_round_trip_and_absence() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join(".venv").join("requirements.3.11.sha256");
        assert_eq!(read_marker(&marker).unwrap(), None);

        let paths = write_files(temp.path(), &[("r.txt", "requests\n")]);
        let fingerprint = RequirementsFingerprint::compute(&paths).unwrap();
        write_marker(&marker, &fingerprint).unwrap();

        let stored = read_marker(&marker).unwrap();
        assert!(fingerprint.matches(stored.as_deref()));
    }

    #[test]
    fn matches_rejects_absent_marker() {
        let fingerprint = RequirementsFingerprint("abc".to_string());
        assert!(!fingerprint.matches(None));
        assert!(!fingerprint.matches(Some("abd")));
    }
}

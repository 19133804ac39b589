//! Zip extraction for dependency archives.
//!
//! Entries are checked against path traversal before anything is written.
//! An archive that fails zip validation is reported as
//! [`ExtractionError::Corrupt`] so callers can delete and re-download it.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path};

use zip::result::ZipError;
use zip::ZipArchive;

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The file is not a readable zip archive.
    #[error("not a valid zip file: {0}")]
    Corrupt(String),

    /// An entry attempts to escape the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },

    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ExtractionError {
    /// Whether re-downloading the archive could fix this.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ExtractionError::Corrupt(_))
    }
}

impl From<ZipError> for ExtractionError {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(e) => ExtractionError::Io(e),
            other => ExtractionError::Corrupt(other.to_string()),
        }
    }
}

/// Extract `archive` into `dest_dir`, returning the extracted file names.
pub fn extract_zip(archive: &Path, dest_dir: &Path) -> Result<Vec<String>, ExtractionError> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    fs::create_dir_all(dest_dir)?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let relative = match entry.enclosed_name() {
            Some(path) if is_contained(&path) => path,
            _ => {
                return Err(ExtractionError::PathTraversal {
                    path: entry.name().to_string(),
                })
            }
        };

        let out_path = dest_dir.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out).map_err(|e| {
            // A truncated or corrupted entry surfaces as InvalidData from
            // the decompressor or the CRC check.
            if e.kind() == io::ErrorKind::InvalidData {
                ExtractionError::Corrupt(e.to_string())
            } else {
                ExtractionError::Io(e)
            }
        })?;

        extracted.push(relative.to_string_lossy().into_owned());
    }

    tracing::debug!(
        "Extracted {} files from {} to {}",
        extracted.len(),
        archive.display(),
        dest_dir.display()
    );
    Ok(extracted)
}

fn is_contained(path: &Path) -> bool {
    !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_nested_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("moztools-4.0.zip");
        write_zip(
            &archive,
            &[
                ("moztools-4.0/bin/nsinstall.exe", "binary"),
                ("moztools-4.0/README", "readme"),
            ],
        );
        let dest = temp.path().join("out");

        let files = extract_zip(&archive, &dest).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(
            fs::read_to_string(dest.join("moztools-4.0").join("README")).unwrap(),
            "readme"
        );
        assert!(dest.join("moztools-4.0/bin/nsinstall.exe").is_file());
    }

    #[test]
    fn garbage_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bad.zip");
        fs::write(&archive, "this is not a zip file").unwrap();

        let err = extract_zip(&archive, &temp.path().join("out")).unwrap_err();

        assert!(err.is_corrupt(), "got: {}", err);
    }

    #[test]
    fn missing_archive_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = extract_zip(&temp.path().join("absent.zip"), temp.path()).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn rejects_parent_dir_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../escape.txt", "nope")]);
        let dest = temp.path().join("out");

        let err = extract_zip(&archive, &dest).unwrap_err();

        assert!(matches!(err, ExtractionError::PathTraversal { .. }));
        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn contained_paths() {
        assert!(is_contained(Path::new("a/b/c.txt")));
        assert!(!is_contained(Path::new("a/../../c.txt")));
        assert!(!is_contained(Path::new("/etc/passwd")));
    }
}

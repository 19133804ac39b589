//! Mock downloader for testing.
//!
//! By default every download writes a small placeholder file. A responder
//! closure can instead write real content (a zip built in the test) or fail.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::Result;

use super::Downloader;

type Responder = Box<dyn Fn(&str, &Path) -> Result<()>>;

/// A recorded download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCall {
    /// User-facing description.
    pub description: String,
    /// Requested URL.
    pub url: String,
    /// Destination file.
    pub dest: PathBuf,
}

#[derive(Default)]
struct MockDownloaderState {
    calls: Vec<DownloadCall>,
    responder: Option<Responder>,
}

/// Downloader that records requests without touching the network.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MockDownloader {
    state: Rc<RefCell<MockDownloaderState>>,
}

impl MockDownloader {
    /// Create a downloader that writes placeholder files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce each download with `responder(url, dest)`.
    pub fn respond_with(&self, responder: impl Fn(&str, &Path) -> Result<()> + 'static) {
        self.state.borrow_mut().responder = Some(Box::new(responder));
    }

    /// All requests so far, in order.
    pub fn calls(&self) -> Vec<DownloadCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of requests so far.
    pub fn count(&self) -> usize {
        self.state.borrow().calls.len()
    }
}

impl Downloader for MockDownloader {
    fn download(&self, description: &str, url: &str, dest: &Path) -> Result<()> {
        self.state.borrow_mut().calls.push(DownloadCall {
            description: description.to_string(),
            url: url.to_string(),
            dest: dest.to_path_buf(),
        });

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        match &self.state.borrow().responder {
            Some(responder) => responder(url, dest),
            None => {
                fs::write(dest, url)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MachError;
    use tempfile::TempDir;

    #[test]
    fn records_and_writes_placeholder() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("sub").join("file.zip");
        let downloader = MockDownloader::new();

        downloader
            .download("file", "https://example.com/file.zip", &dest)
            .unwrap();

        assert_eq!(downloader.count(), 1);
        assert_eq!(downloader.calls()[0].dest, dest);
        assert!(dest.is_file());
    }

    #[test]
    fn responder_can_fail() {
        let temp = TempDir::new().unwrap();
        let downloader = MockDownloader::new();
        downloader.respond_with(|url, _| {
            Err(MachError::Download {
                url: url.to_string(),
                message: "HTTP 503".to_string(),
            })
        });

        let result = downloader.download("x", "https://example.com/x", &temp.path().join("x"));

        assert!(matches!(result, Err(MachError::Download { .. })));
        assert_eq!(downloader.count(), 1);
    }
}

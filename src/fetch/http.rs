//! HTTP downloads with a progress bar.
//!
//! Files are written to `<dest>.part` and renamed into place once the body
//! has been fully received, so an interrupted download never leaves a file
//! at `dest`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::Url;

use crate::error::{MachError, Result};

/// Downloads a URL to a local file.
pub trait Downloader {
    /// Fetch `url` into `dest`, describing it as `description` to the user.
    fn download(&self, description: &str, url: &str, dest: &Path) -> Result<()>;
}

/// Downloader backed by a blocking reqwest client.
pub struct HttpDownloader {
    client: Client,
    quiet: bool,
}

impl HttpDownloader {
    /// Default total timeout; the GStreamer installers are large.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    /// Create a downloader with the default timeout.
    pub fn new(quiet: bool) -> Result<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT, quiet)
    }

    /// Create a downloader with a custom total timeout.
    pub fn with_timeout(timeout: Duration, quiet: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mach/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, quiet })
    }

    fn progress_bar(&self, description: &str, len: Option<u64>) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let bar = match len {
            Some(len) => ProgressBar::new(len).with_style(
                ProgressStyle::with_template(
                    "{msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
            ),
            None => ProgressBar::new_spinner().with_style(
                ProgressStyle::with_template("{spinner} {msg} {bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            ),
        };
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.set_message(format!("Downloading {}", description));
        bar
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, description: &str, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!("Downloading {} from {} to {}", description, url, dest.display());

        let download_error = |message: String| MachError::Download {
            url: url.to_string(),
            message,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| download_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_error(format!("HTTP {}", response.status())));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let partial = partial_path(dest);
        let bar = self.progress_bar(description, response.content_length());

        let copied = {
            let mut writer = bar.wrap_write(BufWriter::new(File::create(&partial)?));
            let copied = response.copy_to(&mut writer);
            writer.flush().map(|_| copied)
        };

        match copied {
            Ok(Ok(bytes)) => {
                bar.finish_and_clear();
                fs::rename(&partial, dest)?;
                tracing::debug!("Downloaded {} bytes to {}", bytes, dest.display());
                Ok(())
            }
            Ok(Err(e)) => {
                bar.abandon();
                let _ = fs::remove_file(&partial);
                Err(download_error(e.to_string()))
            }
            Err(e) => {
                bar.abandon();
                let _ = fs::remove_file(&partial);
                Err(e.into())
            }
        }
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Join `base` and a single file name, percent-encoding the name.
pub fn asset_url(base: &str, name: &str) -> Result<String> {
    let mut url = Url::parse(base)
        .with_context(|| format!("Invalid dependency URL: {}", base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Dependency URL cannot be a base: {}", base))?
        .pop_if_empty()
        .push(name);
    Ok(url.into())
}

/// Last path segment of a URL, used to name downloaded installers.
pub fn url_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn downloads_body_to_destination() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/moztools-4.0.zip");
            then.status(200).body("archive bytes");
        });
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("moztools").join("4.0.zip");

        let downloader = HttpDownloader::new(true).unwrap();
        downloader
            .download("moztools-4.0", &server.url("/moztools-4.0.zip"), &dest)
            .unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "archive bytes");
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn http_error_leaves_no_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.zip");
            then.status(404).body("Not Found");
        });
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.zip");

        let downloader = HttpDownloader::new(true).unwrap();
        let err = downloader
            .download("missing", &server.url("/missing.zip"), &dest)
            .unwrap_err();

        assert!(err.to_string().contains("404"), "got: {}", err);
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn asset_url_percent_encodes_name() {
        let url = asset_url("https://example.com/releases/msvc-deps", "moz tools-4.0.zip").unwrap();
        assert_eq!(url, "https://example.com/releases/msvc-deps/moz%20tools-4.0.zip");
    }

    #[test]
    fn asset_url_tolerates_trailing_slash() {
        let url = asset_url("https://example.com/deps/", "moztools-4.0.zip").unwrap();
        assert_eq!(url, "https://example.com/deps/moztools-4.0.zip");
    }

    #[test]
    fn url_file_name_is_last_segment() {
        assert_eq!(
            url_file_name("https://example.com/deps/gstreamer-1.0-msvc-x86_64-1.22.8.msi"),
            "gstreamer-1.0-msvc-x86_64-1.22.8.msi"
        );
    }
}

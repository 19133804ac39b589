//! Downloading and unpacking platform dependencies.

pub mod archive;
pub mod http;
pub mod mock;

pub use archive::{extract_zip, ExtractionError};
pub use http::{asset_url, url_file_name, Downloader, HttpDownloader};
pub use mock::{DownloadCall, MockDownloader};

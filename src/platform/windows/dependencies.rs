//! Prebuilt MSVC dependency archives.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MachError, Result};
use crate::fetch::{asset_url, extract_zip};
use crate::ui::UserInterface;

use super::{dependency_dir, Windows};

/// Download-and-extract attempts per archive before giving up.
pub const MAX_DOWNLOAD_ATTEMPTS: u32 = 2;

impl Windows<'_> {
    /// Install every declared dependency whose directory is missing.
    pub(super) fn install_missing_dependencies(&self, ui: &mut dyn UserInterface) -> Result<bool> {
        let deps_root = &self.layout.dependencies_dir;
        let to_install: Vec<(&String, &String)> = self
            .config
            .windows
            .dependencies
            .iter()
            .filter(|(package, version)| !dependency_dir(deps_root, package, version).is_dir())
            .collect();

        if to_install.is_empty() {
            tracing::debug!("All MSVC dependencies present in {}", deps_root.display());
            return Ok(false);
        }

        ui.message("Installing missing MSVC dependencies...");
        for (package, version) in to_install {
            let full_spec = format!("{}-{}", package, version);
            let package_dir = dependency_dir(deps_root, package, version);
            let parent_dir = deps_root.join(package);
            fs::create_dir_all(&parent_dir)?;

            let zip_path = with_zip_suffix(&package_dir);
            self.download_and_extract(&zip_path, &full_spec, &parent_dir, ui)?;

            fs::rename(parent_dir.join(&full_spec), &package_dir)?;
            tracing::info!("Installed {} to {}", full_spec, package_dir.display());
        }

        Ok(true)
    }

    /// Fetch `zip_path` unless already present and unpack it into `dest`.
    ///
    /// An archive that fails validation is deleted and fetched again, up to
    /// [`MAX_DOWNLOAD_ATTEMPTS`] times in total.
    fn download_and_extract(
        &self,
        zip_path: &Path,
        full_spec: &str,
        dest: &Path,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        let url = asset_url(&self.config.windows.deps_url, &format!("{}.zip", full_spec))?;
        let staging = dest.join(full_spec);

        for attempt in 1..=MAX_DOWNLOAD_ATTEMPTS {
            if !zip_path.is_file() {
                self.host.downloader.download(full_spec, &url, zip_path)?;
            }

            // Leftovers from an interrupted extraction must not be renamed
            // into place.
            if staging.exists() {
                fs::remove_dir_all(&staging)?;
            }

            ui.message(&format!("Extracting {} to {}...", full_spec, dest.display()));
            match extract_zip(zip_path, dest) {
                Ok(_) => return Ok(()),
                Err(e) if e.is_corrupt() => {
                    tracing::warn!(
                        "Attempt {}/{}: {} is corrupt: {}",
                        attempt,
                        MAX_DOWNLOAD_ATTEMPTS,
                        zip_path.display(),
                        e
                    );
                    if attempt < MAX_DOWNLOAD_ATTEMPTS {
                        ui.warning(&format!(
                            "Error: {}.zip is not a valid zip file, redownload...",
                            full_spec
                        ));
                    }
                    fs::remove_file(zip_path)?;
                }
                Err(e) => return Err(MachError::Extraction(e)),
            }
        }

        Err(MachError::CorruptArchive {
            archive: zip_path.to_path_buf(),
            attempts: MAX_DOWNLOAD_ATTEMPTS,
        })
    }
}

fn with_zip_suffix(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".zip");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MachConfig, ProjectLayout};
    use crate::environment::MapEnv;
    use crate::platform::testing::mock_host;
    use crate::platform::{BuildTarget, Platform};
    use crate::ui::MockUI;
    use std::cell::Cell;
    use std::fs::File;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_moztools_zip(path: &Path) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        writer
            .start_file("moztools-4.0/bin/nsinstall.exe", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"MZ").unwrap();
        writer.finish().unwrap();
    }

    fn setup() -> (TempDir, ProjectLayout, MachConfig) {
        let temp = TempDir::new().unwrap();
        let config = MachConfig::default();
        let layout = ProjectLayout::resolve(temp.path(), &config, &MapEnv::new());
        (temp, layout, config)
    }

    #[test]
    fn absent_dependency_is_downloaded_and_renamed() {
        let (_temp, layout, config) = setup();
        let (host, _, downloader) = mock_host(MapEnv::new());
        downloader.respond_with(|_, dest| {
            write_moztools_zip(dest);
            Ok(())
        });
        let windows = Windows::new(&layout, &config, &host, BuildTarget::host());
        let mut ui = MockUI::new();

        let installed = windows.passive_bootstrap(&mut ui).unwrap();

        assert!(installed);
        let package_dir = layout.dependencies_dir.join("moztools").join("4.0");
        assert!(package_dir.join("bin").join("nsinstall.exe").is_file());
        assert!(!layout.dependencies_dir.join("moztools").join("moztools-4.0").exists());

        let calls = downloader.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].url.ends_with("/msvc-deps/moztools-4.0.zip"));
        assert_eq!(calls[0].dest, with_zip_suffix(&package_dir));
        assert_eq!(ui.count_messages("Installing missing MSVC dependencies..."), 1);
    }

    #[test]
    fn existing_dependency_is_never_downloaded() {
        let (_temp, layout, config) = setup();
        fs::create_dir_all(layout.dependencies_dir.join("moztools").join("4.0")).unwrap();
        let (host, _, downloader) = mock_host(MapEnv::new());
        let windows = Windows::new(&layout, &config, &host, BuildTarget::host());
        let mut ui = MockUI::new();

        assert!(!windows.passive_bootstrap(&mut ui).unwrap());
        assert_eq!(downloader.count(), 0);
        assert!(ui.messages().is_empty());
    }

    #[test]
    fn existing_zip_is_reused() {
        let (_temp, layout, config) = setup();
        let parent = layout.dependencies_dir.join("moztools");
        fs::create_dir_all(&parent).unwrap();
        write_moztools_zip(&parent.join("4.0.zip"));
        let (host, _, downloader) = mock_host(MapEnv::new());
        let windows = Windows::new(&layout, &config, &host, BuildTarget::host());
        let mut ui = MockUI::new();

        assert!(windows.passive_bootstrap(&mut ui).unwrap());
        assert_eq!(downloader.count(), 0);
        assert!(parent.join("4.0").is_dir());
    }

    #[test]
    fn corrupt_archive_is_redownloaded_once() {
        let (_temp, layout, config) = setup();
        let (host, _, downloader) = mock_host(MapEnv::new());
        let attempts = Rc::new(Cell::new(0));
        let seen = Rc::clone(&attempts);
        downloader.respond_with(move |_, dest| {
            seen.set(seen.get() + 1);
            if seen.get() == 1 {
                fs::write(dest, "truncated")?;
            } else {
                write_moztools_zip(dest);
            }
            Ok(())
        });
        let windows = Windows::new(&layout, &config, &host, BuildTarget::host());
        let mut ui = MockUI::new();

        assert!(windows.passive_bootstrap(&mut ui).unwrap());

        assert_eq!(attempts.get(), 2);
        assert!(ui.has_warning("Error: moztools-4.0.zip is not a valid zip file, redownload..."));
        assert!(layout.dependencies_dir.join("moztools").join("4.0").is_dir());
    }

    #[test]
    fn persistent_corruption_is_bounded() {
        let (_temp, layout, config) = setup();
        let (host, _, downloader) = mock_host(MapEnv::new());
        downloader.respond_with(|_, dest| {
            fs::write(dest, "still not a zip")?;
            Ok(())
        });
        let windows = Windows::new(&layout, &config, &host, BuildTarget::host());
        let mut ui = MockUI::new();

        let err = windows.passive_bootstrap(&mut ui).unwrap_err();

        match err {
            MachError::CorruptArchive { attempts, .. } => {
                assert_eq!(attempts, MAX_DOWNLOAD_ATTEMPTS)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(downloader.count(), MAX_DOWNLOAD_ATTEMPTS as usize);
        assert!(!layout.dependencies_dir.join("moztools").join("4.0").exists());
        // No redownload is announced once the attempts are used up.
        let redownloads = ui
            .warnings()
            .iter()
            .filter(|w| w.contains("redownload"))
            .count();
        assert_eq!(redownloads, MAX_DOWNLOAD_ATTEMPTS as usize - 1);
    }

    #[test]
    fn download_failure_propagates() {
        let (_temp, layout, config) = setup();
        let (host, _, downloader) = mock_host(MapEnv::new());
        downloader.respond_with(|url, _| {
            Err(MachError::Download {
                url: url.to_string(),
                message: "HTTP 404".to_string(),
            })
        });
        let windows = Windows::new(&layout, &config, &host, BuildTarget::host());
        let mut ui = MockUI::new();

        let err = windows.passive_bootstrap(&mut ui).unwrap_err();

        assert!(matches!(err, MachError::Download { .. }));
        assert_eq!(downloader.count(), 1);
    }

    #[test]
    fn zip_suffix_is_appended() {
        assert_eq!(
            with_zip_suffix(Path::new("/deps/moztools/4.0")),
            PathBuf::from("/deps/moztools/4.0.zip")
        );
    }
}

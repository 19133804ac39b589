//! GStreamer discovery and MSI installation.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{MachError, Result};
use crate::fetch::url_file_name;
use crate::platform::BuildTarget;
use crate::shell::{path_arg, process_exec, CommandSpec};
use crate::ui::UserInterface;

use super::Windows;

/// Architecture name used in GStreamer install paths and variables.
pub fn gstreamer_arch_name(arch: &str) -> Option<&'static str> {
    match arch {
        "x86_64" => Some("X86_64"),
        "x86" | "i686" | "i586" => Some("X86"),
        "aarch64" => Some("ARM64"),
        _ => None,
    }
}

fn is_gstreamer_root(root: &Path) -> bool {
    root.join("bin").join("ffi-7.dll").exists()
}

/// Elevated quiet administrative install of `installer` into `target_dir`.
pub fn msiexec_command(installer: &Path, target_dir: &Path) -> CommandSpec {
    let arguments = [
        "/a".to_string(),
        format!(
            "\"{}\"TARGETDIR=\"{}\"",
            path_arg(installer),
            path_arg(target_dir)
        ),
        "/qn".to_string(),
    ];
    let quoted = arguments
        .iter()
        .map(|arg| format!("'{}'", arg))
        .collect::<Vec<_>>()
        .join(",");

    CommandSpec::new("powershell")
        .args([
            "exit (Start-Process",
            "-PassThru",
            "-Wait",
            "-verb",
            "runAs",
            "msiexec.exe",
            "-ArgumentList",
        ])
        .arg(format!("@({})", quoted))
        .arg(").ExitCode")
}

impl Windows<'_> {
    /// Bundled install, then `GSTREAMER_1_0_ROOT_MSVC_<ARCH>`, then the
    /// default install directory.
    pub(super) fn find_gstreamer_root(&self, target: &BuildTarget) -> Option<PathBuf> {
        let arch = gstreamer_arch_name(target.arch())?;
        let dir_name = format!("msvc_{}", arch);

        let bundled = self
            .layout
            .dependencies_dir
            .join("gstreamer")
            .join("1.0")
            .join(&dir_name);
        let from_env = self
            .host
            .env
            .get(&format!("GSTREAMER_1_0_ROOT_MSVC_{}", arch))
            .filter(|root| !root.is_empty())
            .map(PathBuf::from);
        let default = self.default_gstreamer_base.join(&dir_name);

        [Some(bundled), from_env, Some(default)]
            .into_iter()
            .flatten()
            .find(|root| is_gstreamer_root(root))
    }

    pub(super) fn install_gstreamer(
        &self,
        target: &BuildTarget,
        force: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<bool> {
        if !force {
            if let Some(root) = self.find_gstreamer_root(target) {
                tracing::debug!("GStreamer found at {}", root.display());
                return Ok(false);
            }
        }

        if target.arch() != "x86_64" {
            ui.warning(
                "Bootstrapping gstreamer not supported on non-x86-64 Windows. Please install manually",
            );
            return Ok(false);
        }

        let deps_dir = &self.layout.dependencies_dir;
        let libs_url = self.config.windows.gstreamer_url();
        let devel_url = self.config.windows.gstreamer_devel_url();

        let temp_dir = TempDir::new()?;
        let libs_msi = temp_dir.path().join(url_file_name(&libs_url));
        let devel_msi = temp_dir.path().join(url_file_name(&devel_url));

        let downloader = self.host.downloader.as_ref();
        downloader.download("GStreamer libraries", &libs_url, &libs_msi)?;
        downloader.download("GStreamer development support", &devel_url, &devel_msi)?;

        ui.message(&format!(
            "Installing GStreamer packages to {}...",
            deps_dir.display()
        ));
        fs::create_dir_all(deps_dir)?;

        for installer in [&libs_msi, &devel_msi] {
            process_exec(self.host.runner.as_ref(), &msiexec_command(installer, deps_dir))?;
        }

        if self.find_gstreamer_root(target).is_none() {
            return Err(MachError::PostInstallCheckFailed {
                what: "GStreamer".to_string(),
            });
        }
        Ok(true)
    }
}

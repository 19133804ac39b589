//! Windows bootstrap: prebuilt MSVC archives, Chocolatey or winget, and the
//! GStreamer MSI installers.

mod dependencies;
mod gstreamer;
mod package_manager;

pub use dependencies::MAX_DOWNLOAD_ATTEMPTS;
pub use gstreamer::{gstreamer_arch_name, msiexec_command};
pub use package_manager::{choco_argument_list, PackageManager};

use std::path::{Path, PathBuf};

use crate::config::{LintTools, MachConfig, ProjectLayout};
use crate::error::Result;
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

use super::{BuildTarget, Host, Platform};

/// Default GStreamer install location used by the upstream installers.
pub const DEFAULT_GSTREAMER_BASE: &str = r"C:\gstreamer\1.0";

/// The Windows platform.
pub struct Windows<'a> {
    layout: &'a ProjectLayout,
    config: &'a MachConfig,
    host: &'a Host,
    target: BuildTarget,
    default_gstreamer_base: PathBuf,
}

impl<'a> Windows<'a> {
    /// Create the platform for `target`.
    pub fn new(
        layout: &'a ProjectLayout,
        config: &'a MachConfig,
        host: &'a Host,
        target: BuildTarget,
    ) -> Self {
        Self {
            layout,
            config,
            host,
            target,
            default_gstreamer_base: PathBuf::from(DEFAULT_GSTREAMER_BASE),
        }
    }

    /// Look for a system-wide GStreamer under `base` instead of the default.
    pub fn with_default_gstreamer_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.default_gstreamer_base = base.into();
        self
    }

    /// Directory a declared dependency extracts to, if `package` is declared.
    pub fn get_dependency_dir(&self, package: &str) -> Option<PathBuf> {
        let version = self.config.windows.dependencies.get(package)?;
        Some(dependency_dir(&self.layout.dependencies_dir, package, version))
    }
}

/// `<deps>/<package>/<version>`.
pub fn dependency_dir(dependencies_dir: &Path, package: &str, version: &str) -> PathBuf {
    dependencies_dir.join(package).join(version)
}

impl Platform for Windows<'_> {
    fn name(&self) -> &str {
        "windows"
    }

    fn runner(&self) -> &dyn CommandRunner {
        self.host.runner.as_ref()
    }

    fn lint_tools(&self) -> &LintTools {
        &self.config.lint_tools
    }

    fn executable_suffix(&self) -> &'static str {
        ".exe"
    }

    fn passive_bootstrap(&self, ui: &mut dyn UserInterface) -> Result<bool> {
        self.install_missing_dependencies(ui)
    }

    fn platform_bootstrap(&self, force: bool, ui: &mut dyn UserInterface) -> Result<bool> {
        let mut installed_something = self.passive_bootstrap(ui)?;
        self.install_system_packages(force, ui)?;
        installed_something |= self.install_gstreamer_if_needed(&self.target, force, ui)?;
        Ok(installed_something)
    }

    fn gstreamer_root(&self, target: &BuildTarget) -> Option<PathBuf> {
        self.find_gstreamer_root(target)
    }

    fn install_gstreamer_if_needed(
        &self,
        target: &BuildTarget,
        force: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<bool> {
        self.install_gstreamer(target, force, ui)
    }
}

//! Per-platform dependency bootstrapping.
//!
//! [`get`] picks the [`Platform`] for the running host: [`Windows`] has the
//! full implementation, every other host gets [`Unsupported`].
//!
//! All side effects go through the [`Host`] handles (commands, downloads,
//! environment), so platforms can be exercised in tests on any OS.

pub mod lints;
pub mod target;
pub mod unsupported;
pub mod windows;

pub use target::BuildTarget;
pub use unsupported::Unsupported;
pub use windows::Windows;

use std::path::PathBuf;

use crate::config::{LintTools, MachConfig, ProjectLayout};
use crate::environment::{ProcessEnv, SystemEnv};
use crate::error::Result;
use crate::fetch::{Downloader, HttpDownloader};
use crate::shell::{CommandRunner, SystemRunner};
use crate::ui::UserInterface;

/// Flags accepted by `mach bootstrap`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Reinstall even when already present.
    pub force: bool,
    /// Skip package managers, archives and GStreamer.
    pub skip_platform: bool,
    /// Skip lint tool installation.
    pub skip_lints: bool,
}

/// Handles to the outside world.
pub struct Host {
    /// Subprocess execution and `PATH` lookup.
    pub runner: Box<dyn CommandRunner>,
    /// HTTP downloads.
    pub downloader: Box<dyn Downloader>,
    /// Environment variables.
    pub env: Box<dyn ProcessEnv>,
}

impl Host {
    /// Real processes, network and environment.
    pub fn system(quiet: bool) -> Result<Self> {
        Ok(Self {
            runner: Box::new(SystemRunner),
            downloader: Box::new(HttpDownloader::new(quiet)?),
            env: Box::new(SystemEnv),
        })
    }
}

/// Operations every platform provides.
pub trait Platform {
    /// Operating system name.
    fn name(&self) -> &str;

    /// Runner used for installers.
    fn runner(&self) -> &dyn CommandRunner;

    /// Lint tools to install.
    fn lint_tools(&self) -> &LintTools;

    /// Suffix of executables (`.exe` on Windows).
    fn executable_suffix(&self) -> &'static str {
        ""
    }

    /// Fast check-and-install of prebuilt dependencies.
    ///
    /// Safe to run before any command; returns whether anything was installed.
    fn passive_bootstrap(&self, ui: &mut dyn UserInterface) -> Result<bool>;

    /// Full platform bootstrap: archives, package manager, GStreamer.
    fn platform_bootstrap(&self, force: bool, ui: &mut dyn UserInterface) -> Result<bool>;

    /// Root of a usable GStreamer installation for `target`, if any.
    fn gstreamer_root(&self, target: &BuildTarget) -> Option<PathBuf>;

    /// Whether GStreamer is available for `target`.
    fn is_gstreamer_installed(&self, target: &BuildTarget) -> bool {
        self.gstreamer_root(target).is_some()
    }

    /// Install GStreamer unless present (or always, when `force`).
    fn install_gstreamer_if_needed(
        &self,
        target: &BuildTarget,
        force: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<bool>;

    /// Install lint tools missing from `PATH`.
    fn install_lint_tools(&self, force: bool, ui: &mut dyn UserInterface) -> Result<bool> {
        lints::install_lint_tools(self.runner(), self.lint_tools(), force, ui)
    }

    /// Run `mach bootstrap`.
    fn bootstrap(&self, opts: &BootstrapOptions, ui: &mut dyn UserInterface) -> Result<()> {
        let mut installed_something = false;

        if !opts.skip_platform {
            installed_something |= self.platform_bootstrap(opts.force, ui)?;
        }
        if !opts.skip_lints {
            installed_something |= self.install_lint_tools(opts.force, ui)?;
        }

        if !installed_something {
            ui.success("Dependencies were already installed!");
        }
        Ok(())
    }
}

/// The platform for the running host.
pub fn get<'a>(
    layout: &'a ProjectLayout,
    config: &'a MachConfig,
    host: &'a Host,
) -> Box<dyn Platform + 'a> {
    let target = BuildTarget::host();
    tracing::debug!("Host target: {}", target);

    if target.is_windows() {
        Box::new(Windows::new(layout, config, host, target))
    } else {
        Box::new(Unsupported::new(std::env::consts::OS, config, host))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::environment::MapEnv;
    use crate::fetch::MockDownloader;
    use crate::shell::MockRunner;

    /// A host backed by mocks, plus clones for assertions.
    pub(crate) fn mock_host(env: MapEnv) -> (Host, MockRunner, MockDownloader) {
        let runner = MockRunner::new();
        let downloader = MockDownloader::new();
        let host = Host {
            runner: Box::new(runner.clone()),
            downloader: Box::new(downloader.clone()),
            env: Box::new(env),
        };
        (host, runner, downloader)
    }
}

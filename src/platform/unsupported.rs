//! Hosts without a bootstrap implementation.

use std::path::PathBuf;

use crate::config::{LintTools, MachConfig};
use crate::error::{MachError, Result};
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

use super::{BuildTarget, Host, Platform};

/// Platform for hosts mach cannot bootstrap.
///
/// Passive bootstrap is a no-op and lint tools still install; everything
/// that needs a system package manager fails with
/// [`MachError::UnsupportedPlatform`].
pub struct Unsupported<'a> {
    os: String,
    config: &'a MachConfig,
    host: &'a Host,
}

impl<'a> Unsupported<'a> {
    /// Create the platform for `os`.
    pub fn new(os: &str, config: &'a MachConfig, host: &'a Host) -> Self {
        Self {
            os: os.to_string(),
            config,
            host,
        }
    }

    fn unsupported(&self, what: &str) -> MachError {
        MachError::UnsupportedPlatform {
            message: format!("{} is not supported on {}.", what, self.os),
        }
    }
}

impl Platform for Unsupported<'_> {
    fn name(&self) -> &str {
        &self.os
    }

    fn runner(&self) -> &dyn CommandRunner {
        self.host.runner.as_ref()
    }

    fn lint_tools(&self) -> &LintTools {
        &self.config.lint_tools
    }

    fn passive_bootstrap(&self, _ui: &mut dyn UserInterface) -> Result<bool> {
        Ok(false)
    }

    fn platform_bootstrap(&self, _force: bool, _ui: &mut dyn UserInterface) -> Result<bool> {
        Err(self.unsupported("Bootstrap"))
    }

    fn gstreamer_root(&self, _target: &BuildTarget) -> Option<PathBuf> {
        None
    }

    fn install_gstreamer_if_needed(
        &self,
        _target: &BuildTarget,
        _force: bool,
        _ui: &mut dyn UserInterface,
    ) -> Result<bool> {
        Err(self.unsupported("Bootstrapping GStreamer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::MapEnv;
    use crate::platform::testing::mock_host;
    use crate::platform::BootstrapOptions;
    use crate::ui::MockUI;

    #[test]
    fn platform_bootstrap_is_unsupported() {
        let config = MachConfig::default();
        let (host, runner, downloader) = mock_host(MapEnv::new());
        let platform = Unsupported::new("freebsd", &config, &host);
        let mut ui = MockUI::new();

        let err = platform
            .bootstrap(&BootstrapOptions::default(), &mut ui)
            .unwrap_err();

        assert_eq!(err.to_string(), "Bootstrap is not supported on freebsd.");
        assert!(runner.calls().is_empty());
        assert_eq!(downloader.count(), 0);
    }

    #[test]
    fn passive_bootstrap_does_nothing() {
        let config = MachConfig::default();
        let (host, _, _) = mock_host(MapEnv::new());
        let platform = Unsupported::new("linux", &config, &host);
        let mut ui = MockUI::new();

        assert!(!platform.passive_bootstrap(&mut ui).unwrap());
        assert!(!platform.is_gstreamer_installed(&BuildTarget::host()));
    }
}

//! System package installation with Chocolatey, falling back to winget.

use std::path::Path;

use crate::config::WindowsConfig;
use crate::error::Result;
use crate::shell::{path_arg, process_exec, CommandRunner, CommandSpec};
use crate::ui::UserInterface;

use super::Windows;

/// A Windows package manager mach knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Elevated `choco install` of the project's package list.
    Chocolatey,
    /// `winget install` of individual packages.
    Winget,
}

impl PackageManager {
    /// Chocolatey when `choco` is on `PATH`, winget otherwise.
    pub fn detect(runner: &dyn CommandRunner) -> Self {
        if runner.find_program("choco").is_some() {
            Self::Chocolatey
        } else {
            Self::Winget
        }
    }

    /// Name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chocolatey => "chocolatey",
            Self::Winget => "winget",
        }
    }

    /// The install command for this manager.
    pub fn install_command(&self, topdir: &Path, config: &WindowsConfig, force: bool) -> CommandSpec {
        match self {
            Self::Chocolatey => {
                let package_list = topdir.join(&config.chocolatey_config);
                CommandSpec::new("powershell")
                    .args([
                        "Start-Process",
                        "-Wait",
                        "-verb",
                        "runAs",
                        "cmd.exe",
                        "-ArgumentList",
                    ])
                    .arg(format!("@({})", choco_argument_list(&package_list, force)))
            }
            Self::Winget => {
                // Never upgrade user-installed toolchains unless forced.
                let upgrade = if force { "--force" } else { "--no-upgrade" };
                CommandSpec::new("winget")
                    .args(["install", "--interactive", upgrade])
                    .args(config.winget_packages.iter().cloned())
                    .inherit_output()
            }
        }
    }
}

/// Argument list for the elevated `cmd.exe`, in PowerShell array syntax.
pub fn choco_argument_list(package_list: &Path, force: bool) -> String {
    let mut args = format!(
        "'/K','choco','install','-y','\"{}\"'",
        path_arg(package_list)
    );
    if force {
        args.push_str(",'-f'");
    }
    args
}

impl Windows<'_> {
    /// Install the system toolchain packages.
    pub(super) fn install_system_packages(
        &self,
        force: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        let runner = self.host.runner.as_ref();
        let manager = PackageManager::detect(runner);
        let spec = manager.install_command(&self.layout.topdir, &self.config.windows, force);
        tracing::debug!("Installing system packages with {}: {}", manager.name(), spec.display());

        let outcome = match manager {
            PackageManager::Chocolatey => process_exec(runner, &spec).map(|_| ()),
            // winget reports already-installed packages with a nonzero exit
            // code; only a failure to start it is fatal.
            PackageManager::Winget => runner.run(&spec).map(|result| {
                if !result.success {
                    tracing::warn!("winget exited with {:?}", result.exit_code);
                }
            }),
        };

        if let Err(e) = outcome {
            ui.error(&format!(
                "Could not run {}.  Follow manual build setup instructions.",
                manager.name()
            ));
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MachConfig, ProjectLayout};
    use crate::environment::MapEnv;
    use crate::error::MachError;
    use crate::platform::testing::mock_host;
    use crate::platform::BuildTarget;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;
    use std::path::PathBuf;

    #[test]
    fn prefers_chocolatey_when_present() {
        let runner = MockRunner::new();
        assert_eq!(PackageManager::detect(&runner), PackageManager::Winget);
        runner.add_program("choco");
        assert_eq!(PackageManager::detect(&runner), PackageManager::Chocolatey);
    }

    #[test]
    fn choco_arguments() {
        let list = PathBuf::from("C:/src/servo/support/windows/chocolatey.config");
        assert_eq!(
            choco_argument_list(&list, false),
            "'/K','choco','install','-y','\"C:/src/servo/support/windows/chocolatey.config\"'"
        );
        assert!(choco_argument_list(&list, true).ends_with(",'-f'"));
    }

    #[test]
    fn chocolatey_runs_elevated_cmd() {
        let config = WindowsConfig::default();
        let spec = PackageManager::Chocolatey.install_command(Path::new("/src/servo"), &config, false);

        assert_eq!(spec.program, "powershell");
        assert_eq!(
            &spec.args[..6],
            &["Start-Process", "-Wait", "-verb", "runAs", "cmd.exe", "-ArgumentList"]
        );
        assert!(spec.args[6].starts_with("@('/K','choco','install','-y',"));
        assert!(spec.args[6].contains("chocolatey.config"));
    }

    #[test]
    fn winget_respects_force() {
        let config = WindowsConfig::default();
        let normal = PackageManager::Winget.install_command(Path::new("/src"), &config, false);
        let forced = PackageManager::Winget.install_command(Path::new("/src"), &config, true);

        assert_eq!(&normal.args[..3], &["install", "--interactive", "--no-upgrade"]);
        assert_eq!(forced.args[2], "--force");
        assert_eq!(&normal.args[3..], config.winget_packages.as_slice());
    }

    #[test]
    fn chocolatey_failure_prints_manual_instructions() {
        let config = MachConfig::default();
        let layout = ProjectLayout::resolve(Path::new("/src/servo"), &config, &MapEnv::new());
        let (host, runner, _) = mock_host(MapEnv::new());
        runner.add_program("choco");
        runner.fail_program("powershell", 1);
        let windows = Windows::new(&layout, &config, &host, BuildTarget::host());
        let mut ui = MockUI::new();

        let err = windows.install_system_packages(false, &mut ui).unwrap_err();

        assert!(matches!(err, MachError::CommandFailed { .. }));
        assert!(ui.has_error("Could not run chocolatey.  Follow manual build setup instructions."));
    }

    #[test]
    fn winget_nonzero_exit_is_not_fatal() {
        let config = MachConfig::default();
        let layout = ProjectLayout::resolve(Path::new("/src/servo"), &config, &MapEnv::new());
        let (host, runner, _) = mock_host(MapEnv::new());
        runner.fail_program("winget", -1978335135);
        let windows = Windows::new(&layout, &config, &host, BuildTarget::host());
        let mut ui = MockUI::new();

        windows.install_system_packages(false, &mut ui).unwrap();

        assert_eq!(runner.count("winget"), 1);
        assert!(ui.errors().is_empty());
    }
}

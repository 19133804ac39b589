//! Fingerprint-gated requirement installation.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::shell::{path_arg, process_exec, CommandRunner, CommandSpec};
use crate::ui::UserInterface;

use super::fingerprint::{read_marker, write_marker, RequirementsFingerprint};

/// Installs a fixed list of requirement files when their fingerprint changes.
pub struct RequirementsInstaller<'a> {
    project_root: &'a Path,
    requirements: &'a [PathBuf],
    marker: &'a Path,
}

impl<'a> RequirementsInstaller<'a> {
    /// Create an installer for `requirements` (absolute paths, in hashing order).
    pub fn new(project_root: &'a Path, requirements: &'a [PathBuf], marker: &'a Path) -> Self {
        Self {
            project_root,
            requirements,
            marker,
        }
    }

    /// The `uv pip install -r ...` command covering every requirement file.
    pub fn install_command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new("uv")
            .args(["pip", "install"])
            .current_dir(self.project_root);
        for requirements in self.requirements {
            spec = spec.arg("-r").arg(path_arg(requirements));
        }
        spec
    }

    /// Install if the stored marker does not match the current fingerprint.
    ///
    /// Returns `true` when the install command ran. The marker is only
    /// written after a successful install, so a failed run is retried next
    /// time.
    pub fn install_if_changed(
        &self,
        runner: &dyn CommandRunner,
        extra_env: &[(String, String)],
        ui: &mut dyn UserInterface,
    ) -> Result<bool> {
        let fingerprint = RequirementsFingerprint::compute(self.requirements)?;
        let stored = read_marker(self.marker)?;

        if fingerprint.matches(stored.as_deref()) {
            tracing::debug!("Requirements unchanged ({})", fingerprint);
            return Ok(false);
        }

        tracing::info!(
            "Requirements fingerprint changed: {:?} -> {}",
            stored,
            fingerprint
        );
        let mut spec = self.install_command();
        for (key, value) in extra_env {
            spec = spec.env(key.as_str(), value.as_str());
        }

        let mut spinner = ui.start_spinner(" * Installing Python requirements...");
        let result = match process_exec(runner, &spec) {
            Ok(result) => result,
            Err(e) => {
                spinner.finish_error("Installing Python requirements failed");
                return Err(e);
            }
        };
        spinner.finish_success("Python requirements installed");
        if ui.output_mode().shows_command_output() && !result.stdout.is_empty() {
            ui.message(result.stdout.trim_end());
        }

        write_marker(self.marker, &fingerprint)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MachError;
    use crate::shell::MockRunner;
    use crate::ui::OutputMode;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        requirements: Vec<PathBuf>,
        marker: PathBuf,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "x").unwrap();
        fs::write(&b, "y").unwrap();
        let marker = temp.path().join(".venv").join("requirements.3.11.sha256");
        Fixture {
            temp,
            requirements: vec![a, b],
            marker,
        }
    }

    #[test]
    fn second_run_with_unchanged_files_is_a_no_op() {
        let f = fixture();
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        let installer = RequirementsInstaller::new(f.temp.path(), &f.requirements, &f.marker);

        assert!(installer.install_if_changed(&runner, &[], &mut ui).unwrap());
        assert!(!installer.install_if_changed(&runner, &[], &mut ui).unwrap());

        assert_eq!(runner.count("uv"), 1);
    }

    #[test]
    fn modified_file_triggers_reinstall_and_updates_marker() {
        let f = fixture();
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        let installer = RequirementsInstaller::new(f.temp.path(), &f.requirements, &f.marker);

        installer.install_if_changed(&runner, &[], &mut ui).unwrap();
        let d1 = fs::read_to_string(&f.marker).unwrap();

        fs::write(&f.requirements[1], "z").unwrap();
        assert!(installer.install_if_changed(&runner, &[], &mut ui).unwrap());
        let d2 = fs::read_to_string(&f.marker).unwrap();

        assert_ne!(d1, d2);
        assert_eq!(runner.count("uv"), 2);
    }

    #[test]
    fn install_command_lists_every_file() {
        let f = fixture();
        let installer = RequirementsInstaller::new(f.temp.path(), &f.requirements, &f.marker);

        let spec = installer.install_command();

        assert_eq!(spec.program, "uv");
        assert_eq!(&spec.args[..2], &["pip", "install"]);
        assert_eq!(spec.args.iter().filter(|a| *a == "-r").count(), 2);
        assert_eq!(spec.cwd.as_deref(), Some(f.temp.path()));
    }

    #[test]
    fn failed_install_leaves_marker_untouched() {
        let f = fixture();
        let runner = MockRunner::new();
        runner.fail_program("uv", 2);
        let mut ui = MockUI::new();
        let installer = RequirementsInstaller::new(f.temp.path(), &f.requirements, &f.marker);

        let err = installer
            .install_if_changed(&runner, &[], &mut ui)
            .unwrap_err();

        assert!(matches!(err, MachError::CommandFailed { code: Some(2), .. }));
        assert!(!f.marker.exists());
    }

    #[test]
    fn announces_install() {
        let f = fixture();
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        let installer = RequirementsInstaller::new(f.temp.path(), &f.requirements, &f.marker);

        installer.install_if_changed(&runner, &[], &mut ui).unwrap();

        assert!(ui.spinners().iter().any(|s| s.contains("Installing Python requirements")));
    }

    #[test]
    fn verbose_mode_echoes_installer_output() {
        let f = fixture();
        let runner = MockRunner::new();
        runner.set_output("uv", "Installed 3 packages\n");
        let installer = RequirementsInstaller::new(f.temp.path(), &f.requirements, &f.marker);

        let mut normal = MockUI::new();
        installer.install_if_changed(&runner, &[], &mut normal).unwrap();
        assert!(!normal.has_message("Installed 3 packages"));

        fs::write(&f.requirements[0], "changed").unwrap();
        let mut verbose = MockUI::with_mode(OutputMode::Verbose);
        installer.install_if_changed(&runner, &[], &mut verbose).unwrap();
        assert!(verbose.has_message("Installed 3 packages"));
    }

    #[test]
    fn extra_env_reaches_the_command() {
        let f = fixture();
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        let installer = RequirementsInstaller::new(f.temp.path(), &f.requirements, &f.marker);

        installer
            .install_if_changed(
                &runner,
                &[("VIRTUAL_ENV".to_string(), "/src/.venv".to_string())],
                &mut ui,
            )
            .unwrap();

        let calls = runner.calls();
        assert!(calls[0].env.iter().any(|(k, _)| k == "VIRTUAL_ENV"));
    }
}

//! Python virtual environment creation and activation.
//!
//! [`VirtualEnv::ensure_ready`] walks the states
//! `Uninitialized -> Created -> Active -> Ready`. When `VIRTUAL_ENV` already
//! points at this environment the first two transitions are skipped, but the
//! requirement fingerprint is always re-checked.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::ProjectLayout;
use crate::error::{MachError, Result};
use crate::requirements::RequirementsInstaller;
use crate::shell::{process_exec, CommandRunner, CommandSpec};
use crate::ui::UserInterface;

use super::ProcessEnv;

/// Variable that marks an activated environment.
pub const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";

/// Lifecycle of the environment during [`VirtualEnv::ensure_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualEnvState {
    /// Nothing done yet.
    Uninitialized,
    /// The environment directory exists.
    Created,
    /// The process environment points at it.
    Active,
    /// Requirements match the marker.
    Ready,
}

/// Variables to change when activating an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Variables to set.
    pub set: Vec<(String, OsString)>,
    /// Variables to remove.
    pub unset: Vec<String>,
}

impl Activation {
    /// Apply to `env`.
    pub fn apply(&self, env: &mut dyn ProcessEnv) {
        for (key, value) in &self.set {
            env.set_os(key, value);
        }
        for key in &self.unset {
            env.remove(key);
        }
    }
}

/// A virtual environment rooted in the checkout.
#[derive(Debug, Clone)]
pub struct VirtualEnv {
    topdir: PathBuf,
    path: PathBuf,
    marker: PathBuf,
    requirements: Vec<PathBuf>,
}

impl VirtualEnv {
    /// Describe the environment for `layout`.
    ///
    /// Fails if the interpreter version cannot be read, since it names the
    /// marker file.
    pub fn for_layout(layout: &ProjectLayout) -> Result<Self> {
        let version = layout.python_version()?;
        Ok(Self {
            topdir: layout.topdir.clone(),
            marker: layout
                .venv_dir
                .join(format!("requirements.{}.sha256", version)),
            path: layout.venv_dir.clone(),
            requirements: layout.requirements.clone(),
        })
    }

    /// Environment directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Requirement marker, keyed by interpreter version.
    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    /// Directory holding the environment's executables.
    pub fn scripts_dir(&self) -> PathBuf {
        let dir = if cfg!(windows) { "Scripts" } else { "bin" };
        self.path.join(dir)
    }

    /// Whether `env` already has this environment activated.
    pub fn is_active(&self, env: &dyn ProcessEnv) -> bool {
        env.get_os(VIRTUAL_ENV_VAR)
            .is_some_and(|active| Path::new(&active) == self.path)
    }

    /// Variables that activate this environment on top of `env`.
    pub fn activation(&self, env: &dyn ProcessEnv) -> Result<Activation> {
        let mut entries = vec![self.scripts_dir()];
        if let Some(path) = env.get_os("PATH") {
            entries.extend(std::env::split_paths(&path));
        }
        let joined = std::env::join_paths(entries)
            .map_err(|e| MachError::Other(anyhow::anyhow!("cannot build PATH: {e}")))?;

        Ok(Activation {
            set: vec![
                (
                    VIRTUAL_ENV_VAR.to_string(),
                    self.path.clone().into_os_string(),
                ),
                ("PATH".to_string(), joined),
                (
                    "PYTHONWARNINGS".to_string(),
                    OsString::from("ignore::SyntaxWarning"),
                ),
            ],
            unset: vec!["PYTHONHOME".to_string()],
        })
    }

    /// Create, activate and populate the environment as needed.
    ///
    /// Creation (`uv venv`) only happens when the marker file is absent.
    pub fn ensure_ready(
        &self,
        runner: &dyn CommandRunner,
        env: &mut dyn ProcessEnv,
        ui: &mut dyn UserInterface,
    ) -> Result<VirtualEnvState> {
        let mut state = VirtualEnvState::Uninitialized;

        if self.is_active(env) {
            tracing::debug!("Virtual environment already active: {}", self.path.display());
            state = VirtualEnvState::Active;
        } else {
            if !self.marker.exists() {
                ui.message(" * Setting up virtual environment...");
                let spec = CommandSpec::new("uv").arg("venv").current_dir(&self.topdir);
                process_exec(runner, &spec)?;
            }
            state = transition(state, VirtualEnvState::Created);

            self.activation(env)?.apply(env);
            state = transition(state, VirtualEnvState::Active);
        }

        let installer = RequirementsInstaller::new(&self.topdir, &self.requirements, &self.marker);
        let child_env = vec![(
            VIRTUAL_ENV_VAR.to_string(),
            self.path.display().to_string(),
        )];
        installer.install_if_changed(runner, &child_env, ui)?;

        Ok(transition(state, VirtualEnvState::Ready))
    }
}

fn transition(from: VirtualEnvState, to: VirtualEnvState) -> VirtualEnvState {
    tracing::debug!("Virtual environment: {:?} -> {:?}", from, to);
    to
}

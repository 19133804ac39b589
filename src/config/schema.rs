//! Configuration schema.
//!
//! Every field has a default, so an empty or absent `.mach.yml` yields the
//! built-in settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Base URL for the prebuilt MSVC dependency archives and installers.
pub const DEFAULT_DEPS_URL: &str =
    "https://github.com/servo/servo-build-deps/releases/download/msvc-deps";

/// GStreamer release installed on Windows.
pub const DEFAULT_GSTREAMER_VERSION: &str = "1.22.8";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachConfig {
    /// Python virtual environment settings.
    pub virtualenv: VirtualEnvConfig,

    /// Windows dependency settings.
    pub windows: WindowsConfig,

    /// Lint tools installed by `mach bootstrap` unless `--skip-lints`.
    pub lint_tools: LintTools,
}

/// Python virtual environment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VirtualEnvConfig {
    /// Environment directory, relative to the top directory.
    pub directory: PathBuf,

    /// Requirement files, relative to the top directory, in hashing order.
    pub requirements: Vec<PathBuf>,
}

impl Default for VirtualEnvConfig {
    fn default() -> Self {
        let wpt_tools = PathBuf::from("tests").join("wpt").join("tests").join("tools");
        Self {
            directory: PathBuf::from(".venv"),
            requirements: vec![
                PathBuf::from("python").join("requirements.txt"),
                wpt_tools.join("requirements_tests.txt"),
                wpt_tools.join("wptrunner").join("requirements.txt"),
            ],
        }
    }
}

/// Windows dependency settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowsConfig {
    /// Base URL for archives and MSI installers.
    pub deps_url: String,

    /// Zipped dependencies: name to version.
    pub dependencies: BTreeMap<String, String>,

    /// Packages installed with winget when Chocolatey is unavailable.
    pub winget_packages: Vec<String>,

    /// Chocolatey package list, relative to the top directory.
    pub chocolatey_config: PathBuf,

    /// GStreamer MSI version.
    pub gstreamer_version: String,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            deps_url: DEFAULT_DEPS_URL.to_string(),
            dependencies: BTreeMap::from([("moztools".to_string(), "4.0".to_string())]),
            winget_packages: vec![
                "Kitware.CMake".to_string(),
                "LLVM.LLVM".to_string(),
                "Ninja-build.Ninja".to_string(),
                "WiXToolset.WiXToolset".to_string(),
            ],
            chocolatey_config: PathBuf::from("support")
                .join("windows")
                .join("chocolatey.config"),
            gstreamer_version: DEFAULT_GSTREAMER_VERSION.to_string(),
        }
    }
}

impl WindowsConfig {
    /// URL of the GStreamer runtime MSI.
    pub fn gstreamer_url(&self) -> String {
        format!(
            "{}/gstreamer-1.0-msvc-x86_64-{}.msi",
            self.deps_url, self.gstreamer_version
        )
    }

    /// URL of the GStreamer development MSI.
    pub fn gstreamer_devel_url(&self) -> String {
        format!(
            "{}/gstreamer-1.0-devel-msvc-x86_64-{}.msi",
            self.deps_url, self.gstreamer_version
        )
    }
}

/// A tool installed with `cargo install`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintTool {
    /// Binary looked up on `PATH`.
    pub binary: String,

    /// Crate passed to `cargo install`.
    pub package: String,
}

/// Lint tool list (newtype so the default is non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LintTools(pub Vec<LintTool>);

impl Default for LintTools {
    fn default() -> Self {
        Self(vec![
            LintTool {
                binary: "taplo".to_string(),
                package: "taplo-cli".to_string(),
            },
            LintTool {
                binary: "cargo-deny".to_string(),
                package: "cargo-deny".to_string(),
            },
        ])
    }
}

//! Configuration loading.
//!
//! mach reads an optional `.mach.yml` from the top directory. Every setting
//! has a built-in default, so most checkouts never need the file.

pub mod layout;
pub mod loader;
pub mod schema;

pub use layout::{check_topdir, ProjectLayout};
pub use loader::{find_topdir, load_config, load_config_file, CONFIG_FILE_NAME};
pub use schema::{
    LintTool, LintTools, MachConfig, VirtualEnvConfig, WindowsConfig, DEFAULT_DEPS_URL,
    DEFAULT_GSTREAMER_VERSION,
};

//! Process environment access and virtual environment activation.
//!
//! Code that reads or mutates environment variables goes through the
//! [`ProcessEnv`] trait so tests can use [`MapEnv`] instead of the real
//! process environment.

pub mod virtualenv;

pub use virtualenv::{Activation, VirtualEnv, VirtualEnvState};

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

/// Read/write access to environment variables.
pub trait ProcessEnv {
    /// Get a variable as raw OS bytes, if set.
    fn get_os(&self, key: &str) -> Option<OsString>;

    /// Set a variable to raw OS bytes.
    fn set_os(&mut self, key: &str, value: &OsStr);

    /// Get a variable, if set and valid unicode.
    fn get(&self, key: &str) -> Option<String> {
        self.get_os(key).and_then(|value| value.into_string().ok())
    }

    /// Set a variable.
    fn set(&mut self, key: &str, value: &str) {
        self.set_os(key, OsStr::new(value));
    }

    /// Remove a variable.
    fn remove(&mut self, key: &str);
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl ProcessEnv for SystemEnv {
    fn get_os(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }

    fn set_os(&mut self, key: &str, value: &OsStr) {
        std::env::set_var(key, value);
    }

    fn remove(&mut self, key: &str) {
        std::env::remove_var(key);
    }
}

/// An in-memory environment.
///
/// # Example
///
/// ```
/// use mach::environment::{MapEnv, ProcessEnv};
///
/// let mut env = MapEnv::new().with("PATH", "/usr/bin");
/// env.set("VIRTUAL_ENV", "/src/.venv");
/// assert_eq!(env.get("PATH").as_deref(), Some("/usr/bin"));
/// assert_eq!(env.get("VIRTUAL_ENV").as_deref(), Some("/src/.venv"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, OsString>,
}

impl MapEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(self, key: &str, value: &str) -> Self {
        self.with_os(key, OsStr::new(value))
    }

    /// Builder-style setter for values that need not be unicode.
    pub fn with_os(mut self, key: &str, value: &OsStr) -> Self {
        self.vars.insert(key.to_string(), value.to_os_string());
        self
    }
}

impl ProcessEnv for MapEnv {
    fn get_os(&self, key: &str) -> Option<OsString> {
        self.vars.get(key).cloned()
    }

    fn set_os(&mut self, key: &str, value: &OsStr) {
        self.vars.insert(key.to_string(), value.to_os_string());
    }

    fn remove(&mut self, key: &str) {
        self.vars.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_env_remove() {
        let mut env = MapEnv::new().with("PYTHONHOME", "/opt/python");
        env.remove("PYTHONHOME");
        assert!(env.get("PYTHONHOME").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_values_survive_as_os_strings() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/opt/caf\xe9/bin");
        let env = MapEnv::new().with_os("PATH", raw);

        assert!(env.get("PATH").is_none());
        assert_eq!(env.get_os("PATH").as_deref(), Some(raw));
    }

    #[test]
    fn system_env_reads_path() {
        // PATH is set in every environment the tests run in.
        assert!(SystemEnv.get("PATH").is_some());
    }
}

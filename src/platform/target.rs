//! Build target triples.

use std::fmt;

/// A target triple such as `x86_64-pc-windows-msvc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    triple: String,
}

impl BuildTarget {
    /// Use `triple`, or the host when `None`.
    pub fn from_triple(triple: Option<&str>) -> Self {
        match triple {
            Some(triple) => Self {
                triple: triple.to_string(),
            },
            None => Self::host(),
        }
    }

    /// The triple this binary runs on.
    pub fn host() -> Self {
        let arch = match std::env::consts::ARCH {
            "x86" => "i686",
            other => other,
        };
        let rest = match std::env::consts::OS {
            "windows" => "pc-windows-msvc".to_string(),
            "macos" => "apple-darwin".to_string(),
            "linux" => "unknown-linux-gnu".to_string(),
            other => format!("unknown-{}", other),
        };
        Self {
            triple: format!("{}-{}", arch, rest),
        }
    }

    /// The full triple.
    pub fn triple(&self) -> &str {
        &self.triple
    }

    /// CPU architecture (first component).
    pub fn arch(&self) -> &str {
        self.triple.split('-').next().unwrap_or_default()
    }

    /// Whether the target OS is Windows.
    pub fn is_windows(&self) -> bool {
        self.triple.contains("windows")
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.triple)
    }
}

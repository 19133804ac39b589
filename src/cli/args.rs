//! Global CLI arguments.
//!
//! The subcommands are registered at runtime from the command modules, so only
//! the flags shared by every command are derived here. [`GlobalArgs`] is
//! attached to the root `clap::Command` built by the dispatcher.

use clap::{ArgMatches, Args, FromArgMatches};
use std::path::PathBuf;

use crate::error::Result;
use crate::ui::OutputMode;

/// Flags accepted before or after any subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Top directory of the checkout (default: discovered from the current directory)
    #[arg(long, global = true, env = "MACH_TOPDIR", value_name = "DIR")]
    pub topdir: Option<PathBuf>,

    /// Path to config file (overrides <topdir>/.mach.yml)
    #[arg(long, global = true, env = "MACH_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show verbose output, including disabled commands
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalArgs {
    /// Add the global flags to `cmd`.
    pub fn augment(cmd: clap::Command) -> clap::Command {
        <Self as Args>::augment_args(cmd)
    }

    /// Read the global flags back out of parsed matches.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Self::from_arg_matches(matches).map_err(|e| anyhow::anyhow!(e).into())
    }

    /// Output mode selected by `-v`/`-q`.
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_flags(self.verbose, self.quiet)
    }
}

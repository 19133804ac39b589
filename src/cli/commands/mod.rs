//! CLI command implementations.
//!
//! Each command implements the [`MachCommand`] trait and is provided by one
//! of the [`COMMAND_MODULES`]. The table is fixed at compile time; the module
//! name shown in `mach help --json` is the source file stem.

pub mod bootstrap_commands;
pub mod devenv_commands;
pub mod dispatcher;
pub mod mach_commands;

pub use dispatcher::{
    Category, CommandContext, CommandModule, CommandResult, Mach, MachCommand, RegisteredCommand,
};

use crate::cli::categories::CATEGORIES;
use crate::error::Result;

/// Every module contributing commands, in load order.
pub const COMMAND_MODULES: &[CommandModule] = &[
    bootstrap_commands::MODULE,
    devenv_commands::MODULE,
    mach_commands::MODULE,
];

/// A registry with every category and command module loaded.
pub fn create_mach() -> Result<Mach> {
    let mut mach = Mach::new();
    for category in CATEGORIES {
        mach.define_category(
            category.name,
            category.short,
            category.long,
            category.priority,
        )?;
    }
    for module in COMMAND_MODULES {
        mach.load_commands(module)?;
    }
    Ok(mach)
}

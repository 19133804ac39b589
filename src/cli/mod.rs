//! Command-line interface for mach.
//!
//! # Architecture
//!
//! - [`args`] - Global flags shared by every command
//! - [`categories`] - Category titles and sort priorities for `mach help`
//! - [`commands`] - The command registry and command implementations

pub mod args;
pub mod categories;
pub mod commands;

pub use args::GlobalArgs;
pub use commands::{
    create_mach, CommandContext, CommandModule, CommandResult, Mach, MachCommand,
};

//! Command registry and dispatch.
//!
//! This module provides the core command infrastructure:
//! - [`MachCommand`] trait for implementing commands
//! - [`CommandModule`] for the static table of command providers
//! - [`CommandContext`] with the resolved checkout, config and host handles
//! - [`CommandResult`] for uniform result reporting
//! - [`Mach`], the registry that builds the CLI and routes subcommands

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::ArgMatches;

use crate::cli::args::GlobalArgs;
use crate::config::{MachConfig, ProjectLayout};
use crate::environment::{VirtualEnv, VirtualEnvState};
use crate::error::{MachError, Result};
use crate::platform::{self, BuildTarget, Host, Platform};
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait MachCommand {
    /// Subcommand name.
    fn name(&self) -> &'static str;

    /// Category the command is listed under.
    fn category(&self) -> &'static str;

    /// One-line description for `mach help`.
    fn description(&self) -> &'static str;

    /// Add command-specific arguments.
    fn args(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Why the command cannot run here, if it cannot.
    fn unavailable_reason(&self, _ctx: &CommandContext) -> Option<String> {
        None
    }

    /// Whether the virtual environment must be active before [`execute`](Self::execute).
    fn requires_virtualenv(&self) -> bool {
        false
    }

    /// Execute the command.
    fn execute(
        &self,
        mach: &Mach,
        matches: &ArgMatches,
        ctx: &mut CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// A source file contributing commands.
#[derive(Clone, Copy)]
pub struct CommandModule {
    /// Source path, normally `file!()`.
    pub path: &'static str,
    /// Constructor for the module's commands.
    pub commands: fn() -> Vec<Box<dyn MachCommand>>,
}

impl CommandModule {
    /// Module name: the file stem of [`path`](Self::path).
    pub fn name(&self) -> &'static str {
        Path::new(self.path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(self.path)
    }
}

/// A registered category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub short: String,
    pub long: String,
    pub priority: u32,
}

/// A command together with the module that registered it.
pub struct RegisteredCommand {
    pub module: &'static str,
    pub command: Box<dyn MachCommand>,
}

/// Everything a command may touch.
pub struct CommandContext {
    pub layout: ProjectLayout,
    pub config: MachConfig,
    pub host: Host,
    /// Target platform dependencies are installed for.
    pub target: BuildTarget,
    /// `-v` was given.
    pub verbose: bool,
}

impl CommandContext {
    /// Context for the running host.
    pub fn new(layout: ProjectLayout, config: MachConfig, host: Host) -> Self {
        Self {
            layout,
            config,
            host,
            target: BuildTarget::host(),
            verbose: false,
        }
    }

    /// Set verbosity.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Checkout root.
    pub fn topdir(&self) -> &Path {
        &self.layout.topdir
    }

    /// Platform implementation for the running host.
    pub fn platform(&self) -> Box<dyn Platform + '_> {
        platform::get(&self.layout, &self.config, &self.host)
    }

    /// Create, activate and populate the virtual environment.
    pub fn activate_virtualenv(&mut self, ui: &mut dyn UserInterface) -> Result<VirtualEnvState> {
        let venv = VirtualEnv::for_layout(&self.layout)?;
        venv.ensure_ready(self.host.runner.as_ref(), self.host.env.as_mut(), ui)
    }
}

type ContextHandler = Box<dyn Fn(Option<&str>) -> Result<Option<PathBuf>>>;

/// The command registry.
#[derive(Default)]
pub struct Mach {
    categories: BTreeMap<String, Category>,
    commands: BTreeMap<&'static str, RegisteredCommand>,
    populate_context_handler: Option<ContextHandler>,
}

impl Mach {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category.
    pub fn define_category(
        &mut self,
        name: &str,
        short: &str,
        long: &str,
        priority: u32,
    ) -> Result<()> {
        if self.categories.contains_key(name) {
            return Err(MachError::DuplicateCategory {
                name: name.to_string(),
            });
        }
        self.categories.insert(
            name.to_string(),
            Category {
                name: name.to_string(),
                short: short.to_string(),
                long: long.to_string(),
                priority,
            },
        );
        Ok(())
    }

    /// Add every command provided by `module`.
    ///
    /// Categories must be defined first.
    pub fn load_commands(&mut self, module: &CommandModule) -> Result<()> {
        let module_name = module.name();
        tracing::debug!("Loading commands from {}", module_name);

        for command in (module.commands)() {
            let name = command.name();
            if let Some(existing) = self.commands.get(name) {
                return Err(MachError::DuplicateCommand {
                    name: name.to_string(),
                    module: existing.module.to_string(),
                });
            }
            if !self.categories.contains_key(command.category()) {
                return Err(MachError::UnknownCategory {
                    command: name.to_string(),
                    category: command.category().to_string(),
                });
            }
            self.commands.insert(
                name,
                RegisteredCommand {
                    module: module_name,
                    command,
                },
            );
        }
        Ok(())
    }

    /// Install the hook answering context lookups.
    pub fn set_populate_context_handler<F>(&mut self, handler: F)
    where
        F: Fn(Option<&str>) -> Result<Option<PathBuf>> + 'static,
    {
        self.populate_context_handler = Some(Box::new(handler));
    }

    /// Answer `topdir` lookups with `topdir`.
    pub fn set_topdir(&mut self, topdir: PathBuf) {
        self.set_populate_context_handler(move |key: Option<&str>| match key {
            None => Ok(None),
            Some("topdir") => Ok(Some(topdir.clone())),
            Some(other) => Err(MachError::UnknownContextKey {
                key: other.to_string(),
            }),
        });
    }

    /// Look up a context value.
    pub fn populate_context(&self, key: Option<&str>) -> Result<Option<PathBuf>> {
        match (&self.populate_context_handler, key) {
            (Some(handler), key) => handler(key),
            (None, None) => Ok(None),
            (None, Some(key)) => Err(MachError::UnknownContextKey {
                key: key.to_string(),
            }),
        }
    }

    /// Categories, highest priority first.
    pub fn categories_by_priority(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.values().collect();
        categories.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.name.cmp(&b.name)));
        categories
    }

    /// Registered commands, by name.
    pub fn commands(&self) -> impl Iterator<Item = &RegisteredCommand> {
        self.commands.values()
    }

    /// Look up a command.
    pub fn command(&self, name: &str) -> Option<&dyn MachCommand> {
        self.commands.get(name).map(|r| r.command.as_ref())
    }

    /// The clap command tree.
    pub fn cli(&self) -> clap::Command {
        let mut cmd = GlobalArgs::augment(
            clap::Command::new("mach")
                .version(env!("CARGO_PKG_VERSION"))
                .about("Bootstrap the development environment and run project commands")
                .disable_help_subcommand(true),
        );
        for registered in self.commands.values() {
            let command = registered.command.as_ref();
            let sub = clap::Command::new(command.name()).about(command.description());
            cmd = cmd.subcommand(command.args(sub));
        }
        cmd
    }

    /// Route parsed arguments to their command. No subcommand means `help`.
    pub fn dispatch(
        &self,
        matches: &ArgMatches,
        ctx: &mut CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let defaults = ArgMatches::default();
        let (name, sub_matches) = matches.subcommand().unwrap_or(("help", &defaults));

        let registered = self
            .commands
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown command: {}", name))?;
        let command = registered.command.as_ref();

        if let Some(reason) = command.unavailable_reason(ctx) {
            return Err(MachError::CommandUnavailable {
                name: name.to_string(),
                reason,
            });
        }

        if command.requires_virtualenv() {
            let state = ctx.activate_virtualenv(ui)?;
            tracing::debug!("Virtual environment {:?} for '{}'", state, name);
        }

        tracing::debug!("Dispatching '{}' ({})", name, registered.module);
        command.execute(self, sub_matches, ctx, ui)
    }
}

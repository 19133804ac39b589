//! Development environment commands.

use clap::ArgMatches;

use crate::environment::VirtualEnv;
use crate::error::Result;
use crate::platform::windows::dependency_dir;
use crate::ui::UserInterface;

use super::dispatcher::{CommandContext, CommandModule, CommandResult, Mach, MachCommand};

pub const MODULE: CommandModule = CommandModule {
    path: file!(),
    commands,
};

fn commands() -> Vec<Box<dyn MachCommand>> {
    vec![Box::new(Venv), Box::new(DepsStatus)]
}

/// `mach venv`
///
/// The dispatcher does the work; this reports where the environment lives.
pub struct Venv;

impl MachCommand for Venv {
    fn name(&self) -> &'static str {
        "venv"
    }

    fn category(&self) -> &'static str {
        "devenv"
    }

    fn description(&self) -> &'static str {
        "Set up the Python virtual environment and install requirements."
    }

    fn requires_virtualenv(&self) -> bool {
        true
    }

    fn execute(
        &self,
        _mach: &Mach,
        _matches: &ArgMatches,
        ctx: &mut CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        ui.success(&format!(
            "Virtual environment ready at {}",
            ctx.layout.venv_dir.display()
        ));
        Ok(CommandResult::success())
    }
}

/// `mach deps-status`
pub struct DepsStatus;

impl MachCommand for DepsStatus {
    fn name(&self) -> &'static str {
        "deps-status"
    }

    fn category(&self) -> &'static str {
        "devenv"
    }

    fn description(&self) -> &'static str {
        "Show which platform dependencies are installed."
    }

    fn execute(
        &self,
        _mach: &Mach,
        _matches: &ArgMatches,
        ctx: &mut CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let deps_root = &ctx.layout.dependencies_dir;
        ui.show_header(&format!("Dependencies in {}", deps_root.display()));

        for (package, version) in &ctx.config.windows.dependencies {
            let dir = dependency_dir(deps_root, package, version);
            let state = if dir.is_dir() { "installed" } else { "missing" };
            ui.message(&format!("  {} {}: {}", package, version, state));
        }

        let platform = ctx.platform();
        match platform.gstreamer_root(&ctx.target) {
            Some(root) => ui.message(&format!("  gstreamer: {}", root.display())),
            None => ui.message("  gstreamer: not found"),
        }

        match VirtualEnv::for_layout(&ctx.layout) {
            Ok(venv) if venv.marker_path().is_file() => {
                ui.message(&format!("  python requirements: installed ({})", venv.path().display()))
            }
            Ok(_) => ui.message("  python requirements: not installed"),
            Err(e) => {
                tracing::debug!("No virtual environment: {}", e);
                ui.message("  python requirements: unknown (no .python-version)")
            }
        }

        Ok(CommandResult::success())
    }
}

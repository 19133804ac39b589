//! Bootstrap commands.

use clap::{Arg, ArgAction, ArgMatches};

use crate::error::Result;
use crate::platform::BootstrapOptions;
use crate::ui::UserInterface;

use super::dispatcher::{CommandContext, CommandModule, CommandResult, Mach, MachCommand};

pub const MODULE: CommandModule = CommandModule {
    path: file!(),
    commands,
};

fn commands() -> Vec<Box<dyn MachCommand>> {
    vec![Box::new(Bootstrap), Box::new(BootstrapGstreamer)]
}

fn force_arg() -> Arg {
    Arg::new("force")
        .short('f')
        .long("force")
        .action(ArgAction::SetTrue)
        .help("Reinstall packages that are already present")
}

/// `mach bootstrap`
pub struct Bootstrap;

impl MachCommand for Bootstrap {
    fn name(&self) -> &'static str {
        "bootstrap"
    }

    fn category(&self) -> &'static str {
        "bootstrap"
    }

    fn description(&self) -> &'static str {
        "Install required packages for building."
    }

    fn args(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(force_arg())
            .arg(
                Arg::new("skip-platform")
                    .long("skip-platform")
                    .action(ArgAction::SetTrue)
                    .help("Skip platform bootstrapping."),
            )
            .arg(
                Arg::new("skip-lints")
                    .long("skip-lints")
                    .action(ArgAction::SetTrue)
                    .help("Skip tool necessary for linting."),
            )
    }

    fn requires_virtualenv(&self) -> bool {
        true
    }

    fn execute(
        &self,
        _mach: &Mach,
        matches: &ArgMatches,
        ctx: &mut CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let opts = BootstrapOptions {
            force: matches.get_flag("force"),
            skip_platform: matches.get_flag("skip-platform"),
            skip_lints: matches.get_flag("skip-lints"),
        };
        tracing::debug!("Bootstrapping with {:?}", opts);

        ctx.platform().bootstrap(&opts, ui)?;
        Ok(CommandResult::success())
    }
}

/// `mach bootstrap-gstreamer`
pub struct BootstrapGstreamer;

impl MachCommand for BootstrapGstreamer {
    fn name(&self) -> &'static str {
        "bootstrap-gstreamer"
    }

    fn category(&self) -> &'static str {
        "bootstrap"
    }

    fn description(&self) -> &'static str {
        "Set up a local copy of the gstreamer libraries (Windows only)."
    }

    fn args(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(force_arg())
    }

    fn unavailable_reason(&self, ctx: &CommandContext) -> Option<String> {
        if ctx.target.is_windows() {
            None
        } else {
            Some(format!(
                "GStreamer bootstrapping is only supported on Windows (target: {})",
                ctx.target
            ))
        }
    }

    fn execute(
        &self,
        _mach: &Mach,
        matches: &ArgMatches,
        ctx: &mut CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let force = matches.get_flag("force");
        let platform = ctx.platform();

        let installed = platform.install_gstreamer_if_needed(&ctx.target, force, ui)?;
        if !installed && platform.is_gstreamer_installed(&ctx.target) {
            ui.success("GStreamer was already installed!");
        }
        Ok(CommandResult::success())
    }
}

//! Commands about mach itself: `help` and `completions`.

use std::io::Write;

use clap::{value_parser, Arg, ArgAction, ArgMatches};
use clap_complete::Shell;
use serde::Serialize;

use crate::cli::categories::DISABLED;
use crate::error::Result;
use crate::ui::{should_use_colors, MachTheme, UserInterface};

use super::dispatcher::{CommandContext, CommandModule, CommandResult, Mach, MachCommand};

pub const MODULE: CommandModule = CommandModule {
    path: file!(),
    commands,
};

fn commands() -> Vec<Box<dyn MachCommand>> {
    vec![Box::new(Help), Box::new(Completions)]
}

/// A category as listed by `mach help`.
#[derive(Debug, Serialize)]
pub struct HelpSection {
    pub name: String,
    pub title: String,
    pub description: String,
    pub priority: u32,
    pub commands: Vec<HelpEntry>,
}

/// A command as listed by `mach help`.
#[derive(Debug, Serialize)]
pub struct HelpEntry {
    pub name: String,
    pub description: String,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<String>,
}

/// Non-empty categories in descending priority.
///
/// Commands that cannot run in `ctx` move to the disabled category, which is
/// only included when `verbose`.
pub fn help_sections(mach: &Mach, ctx: &CommandContext, verbose: bool) -> Vec<HelpSection> {
    mach.categories_by_priority()
        .into_iter()
        .filter(|category| verbose || category.name != DISABLED)
        .map(|category| {
            let commands = mach
                .commands()
                .filter_map(|registered| {
                    let command = registered.command.as_ref();
                    let unavailable = command.unavailable_reason(ctx);
                    let listed_under = if unavailable.is_some() {
                        DISABLED
                    } else {
                        command.category()
                    };
                    (listed_under == category.name).then(|| HelpEntry {
                        name: command.name().to_string(),
                        description: command.description().to_string(),
                        module: registered.module.to_string(),
                        unavailable,
                    })
                })
                .collect();

            HelpSection {
                name: category.name.clone(),
                title: category.short.clone(),
                description: category.long.clone(),
                priority: category.priority,
                commands,
            }
        })
        .filter(|section| !section.commands.is_empty())
        .collect()
}

/// `mach help`
pub struct Help;

impl MachCommand for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn category(&self) -> &'static str {
        "misc"
    }

    fn description(&self) -> &'static str {
        "Show the available commands, grouped by category."
    }

    fn args(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the command listing as JSON"),
        )
    }

    fn execute(
        &self,
        mach: &Mach,
        matches: &ArgMatches,
        ctx: &mut CommandContext,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        // Also reached with empty matches when no subcommand is given.
        let json = matches
            .try_get_one::<bool>("json")
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);
        let sections = help_sections(mach, ctx, ctx.verbose);

        if json {
            let rendered = serde_json::to_string_pretty(&sections).map_err(anyhow::Error::from)?;
            ui.message(&rendered);
            return Ok(CommandResult::success());
        }

        let theme = if ui.is_interactive() && should_use_colors() {
            MachTheme::new()
        } else {
            MachTheme::plain()
        };
        let width = sections
            .iter()
            .flat_map(|s| s.commands.iter().map(|c| c.name.len()))
            .max()
            .unwrap_or(0);

        ui.message("usage: mach [-v] [-q] [--topdir DIR] <command> [<args>]");
        for section in &sections {
            ui.message("");
            ui.message(&format!("{}:", theme.header.apply_to(&section.title)));
            ui.message(&format!("    {}", theme.dim.apply_to(&section.description)));
            ui.message("");
            for entry in &section.commands {
                ui.message(&format!(
                    "  {:width$}  {}",
                    entry.name,
                    entry.description,
                    width = width
                ));
            }
        }
        Ok(CommandResult::success())
    }
}

/// Write the completion script for `shell`.
pub fn write_completions(mach: &Mach, shell: Shell, out: &mut dyn Write) {
    let mut cmd = mach.cli();
    clap_complete::generate(shell, &mut cmd, "mach", out);
}

/// `mach completions`
pub struct Completions;

impl MachCommand for Completions {
    fn name(&self) -> &'static str {
        "completions"
    }

    fn category(&self) -> &'static str {
        "misc"
    }

    fn description(&self) -> &'static str {
        "Generate a shell completion script."
    }

    fn args(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            Arg::new("shell")
                .required(true)
                .value_parser(value_parser!(Shell))
                .help("Shell to generate completions for"),
        )
    }

    fn execute(
        &self,
        mach: &Mach,
        matches: &ArgMatches,
        _ctx: &mut CommandContext,
        _ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let shell = matches
            .get_one::<Shell>("shell")
            .copied()
            .ok_or_else(|| anyhow::anyhow!("No shell given"))?;
        write_completions(mach, shell, &mut std::io::stdout());
        Ok(CommandResult::success())
    }
}

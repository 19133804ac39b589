//! mach CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::ArgMatches;
use mach::cli::{create_mach, CommandContext, CommandResult, GlobalArgs, Mach};
use mach::config::{check_topdir, find_topdir, load_config, ProjectLayout};
use mach::environment::SystemEnv;
use mach::platform::Host;
use mach::ui::{create_ui, OutputMode, UserInterface};
use mach::{MachError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr so `mach help --json` and `mach completions` stay clean.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("mach=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mach=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// `--topdir`, else the discovered checkout root, else the current directory.
fn resolve_topdir(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let topdir = match explicit {
        Some(dir) => cwd.join(dir),
        None => find_topdir(&cwd).unwrap_or(cwd),
    };
    Ok(std::path::absolute(&topdir)?)
}

fn run(
    mach: &mut Mach,
    matches: &ArgMatches,
    globals: &GlobalArgs,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    let topdir = resolve_topdir(globals.topdir.as_deref())?;
    tracing::debug!("Top directory: {}", topdir.display());
    check_topdir(&topdir, cfg!(windows))?;
    mach.set_topdir(topdir.clone());

    let config = load_config(&topdir, globals.config.as_deref())?;
    let layout = ProjectLayout::resolve(&topdir, &config, &SystemEnv);
    let quiet = globals.output_mode() == OutputMode::Quiet;
    let host = Host::system(quiet)?;

    let mut ctx = CommandContext::new(layout, config, host).with_verbose(globals.verbose);
    mach.dispatch(matches, &mut ctx, ui)
}

/// Exit status for a failed subprocess.
fn failure_code(code: Option<i32>) -> u8 {
    code.and_then(|c| u8::try_from(c).ok())
        .filter(|c| *c != 0)
        .unwrap_or(1)
}

fn main() -> ExitCode {
    let mut mach = match create_mach() {
        Ok(mach) => mach,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    let matches = mach.cli().get_matches();
    let globals = match GlobalArgs::from_matches(&matches) {
        Ok(globals) => globals,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    init_tracing(globals.debug);

    tracing::debug!("mach starting with args: {:?}", globals);

    // Handle --no-color
    if globals.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let mut ui = create_ui(globals.output_mode());

    match run(&mut mach, &matches, &globals, ui.as_mut()) {
        Ok(result) if result.success => ExitCode::SUCCESS,
        Ok(result) => ExitCode::from(failure_code(Some(result.exit_code))),
        Err(MachError::CommandFailed {
            command,
            code,
            output,
        }) => {
            ui.show_error_block(&command, &output, None);
            match code {
                Some(code) => ui.error(&format!("Process failed with return code: {}", code)),
                None => ui.error(&format!("Could not run {}", command)),
            }
            ExitCode::from(failure_code(code))
        }
        Err(e @ MachError::CommandUnavailable { .. }) => {
            ui.error(&format!("Error: {}", e));
            ui.show_hint("Run 'mach help -v' to list commands unavailable here");
            ExitCode::from(1)
        }
        Err(MachError::UnsupportedPlatform { message }) => {
            ui.error(&message);
            ExitCode::from(1)
        }
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}

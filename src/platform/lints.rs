//! Lint tool installation through `cargo install`.

use crate::config::LintTools;
use crate::error::Result;
use crate::shell::{process_exec, CommandRunner, CommandSpec};
use crate::ui::UserInterface;

/// Install every tool in `tools` that is missing from `PATH`, or all of
/// them when `force` is set. Returns whether anything was installed.
pub fn install_lint_tools(
    runner: &dyn CommandRunner,
    tools: &LintTools,
    force: bool,
    ui: &mut dyn UserInterface,
) -> Result<bool> {
    let mut installed = false;

    for tool in &tools.0 {
        if !force {
            if let Some(path) = runner.find_program(&tool.binary) {
                tracing::debug!("{} already installed at {}", tool.binary, path.display());
                continue;
            }
        }

        ui.message(&format!(" * Installing {}...", tool.package));
        let spec = CommandSpec::new("cargo")
            .args(["install", tool.package.as_str(), "--locked"])
            .inherit_output();
        process_exec(runner, &spec)?;
        installed = true;
    }

    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LintTool;
    use crate::error::MachError;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;

    #[test]
    fn installs_missing_tools_only() {
        let runner = MockRunner::new();
        runner.add_program("taplo");
        let mut ui = MockUI::new();

        let installed = install_lint_tools(&runner, &LintTools::default(), false, &mut ui).unwrap();

        assert!(installed);
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["install", "cargo-deny", "--locked"]);
        assert!(ui.has_message("Installing cargo-deny"));
    }

    #[test]
    fn nothing_to_do_when_present() {
        let runner = MockRunner::new();
        runner.add_program("taplo");
        runner.add_program("cargo-deny");
        let mut ui = MockUI::new();

        let installed = install_lint_tools(&runner, &LintTools::default(), false, &mut ui).unwrap();

        assert!(!installed);
        assert_eq!(runner.count("cargo"), 0);
    }

    #[test]
    fn force_reinstalls() {
        let runner = MockRunner::new();
        runner.add_program("taplo");
        runner.add_program("cargo-deny");
        let mut ui = MockUI::new();

        install_lint_tools(&runner, &LintTools::default(), true, &mut ui).unwrap();

        assert_eq!(runner.count("cargo"), 2);
    }

    #[test]
    fn failure_propagates() {
        let runner = MockRunner::new();
        runner.fail_program("cargo", 101);
        let tools = LintTools(vec![LintTool {
            binary: "taplo".into(),
            package: "taplo-cli".into(),
        }]);
        let mut ui = MockUI::new();

        let err = install_lint_tools(&runner, &tools, false, &mut ui).unwrap_err();

        assert!(matches!(err, MachError::CommandFailed { code: Some(101), .. }));
    }
}

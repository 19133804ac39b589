//! Mock command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] without spawning processes. It
//! records every spec it is asked to run, reports configurable exit codes,
//! and can run a hook to simulate an installer's side effects.
//!
//! Clones share state, so a test can keep one clone for assertions after
//! handing another to the code under test.
//!
//! # Example
//!
//! ```
//! use mach::shell::{CommandRunner, CommandSpec, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.fail_program("winget", 1);
//!
//! let result = runner.run(&CommandSpec::new("winget").arg("install")).unwrap();
//! assert!(!result.success);
//! assert_eq!(runner.programs_run(), vec!["winget".to_string()]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::error::Result;

use super::{CommandResult, CommandRunner, CommandSpec};

type RunHook = Box<dyn Fn(&CommandSpec)>;

#[derive(Default)]
struct MockRunnerState {
    calls: Vec<CommandSpec>,
    exit_codes: HashMap<String, i32>,
    outputs: HashMap<String, String>,
    programs: HashMap<String, PathBuf>,
    hook: Option<RunHook>,
}

/// Mock runner that records invocations.
#[derive(Clone, Default)]
pub struct MockRunner {
    state: Rc<RefCell<MockRunnerState>>,
}

impl MockRunner {
    /// Create a runner where every command succeeds and no program is on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `program` exit with `code`.
    pub fn fail_program(&self, program: &str, code: i32) {
        self.state
            .borrow_mut()
            .exit_codes
            .insert(program.to_string(), code);
    }

    /// Set the stdout reported for `program`.
    pub fn set_output(&self, program: &str, output: &str) {
        self.state
            .borrow_mut()
            .outputs
            .insert(program.to_string(), output.to_string());
    }

    /// Pretend `program` is installed on `PATH`.
    pub fn add_program(&self, program: &str) {
        let path = PathBuf::from("/mock/bin").join(program);
        self.state
            .borrow_mut()
            .programs
            .insert(program.to_string(), path);
    }

    /// Run `hook` for every command, before the result is reported.
    pub fn on_run(&self, hook: impl Fn(&CommandSpec) + 'static) {
        self.state.borrow_mut().hook = Some(Box::new(hook));
    }

    /// All specs run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.state.borrow().calls.clone()
    }

    /// Program names run so far, in order.
    pub fn programs_run(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(|c| c.program.clone())
            .collect()
    }

    /// Number of times `program` was run.
    pub fn count(&self, program: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.program == program)
            .count()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        self.state.borrow_mut().calls.push(spec.clone());

        if let Some(hook) = &self.state.borrow().hook {
            hook(spec);
        }

        let state = self.state.borrow();
        let stdout = state.outputs.get(&spec.program).cloned().unwrap_or_default();
        match state.exit_codes.get(&spec.program) {
            Some(code) => Ok(CommandResult::failure(
                Some(*code),
                stdout,
                format!("{} failed", spec.program),
                Duration::ZERO,
            )),
            None => Ok(CommandResult::success(stdout, String::new(), Duration::ZERO)),
        }
    }

    fn find_program(&self, program: &str) -> Option<PathBuf> {
        self.state.borrow().programs.get(program).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn records_calls_in_order() {
        let runner = MockRunner::new();
        runner.run(&CommandSpec::new("uv").arg("venv")).unwrap();
        runner.run(&CommandSpec::new("cargo").arg("install")).unwrap();

        assert_eq!(runner.programs_run(), vec!["uv", "cargo"]);
        assert_eq!(runner.count("uv"), 1);
    }

    #[test]
    fn clones_share_state() {
        let runner = MockRunner::new();
        let observer = runner.clone();
        runner.run(&CommandSpec::new("uv")).unwrap();
        assert_eq!(observer.count("uv"), 1);
    }

    #[test]
    fn programs_are_absent_until_added() {
        let runner = MockRunner::new();
        assert!(runner.find_program("choco").is_none());
        runner.add_program("choco");
        assert!(runner.find_program("choco").is_some());
    }

    #[test]
    fn hook_runs_for_each_command() {
        let runner = MockRunner::new();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        runner.on_run(move |_| counter.set(counter.get() + 1));

        runner.run(&CommandSpec::new("a")).unwrap();
        runner.run(&CommandSpec::new("b")).unwrap();

        assert_eq!(seen.get(), 2);
    }
}

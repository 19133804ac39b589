//! Subprocess execution and program lookup.

pub mod command;
pub mod lookup;
pub mod mock;

pub use command::{
    path_arg, process_exec, CommandResult, CommandRunner, CommandSpec, SystemRunner,
};
pub use lookup::resolve_tool_path;
pub use mock::MockRunner;

/// Check if running in a CI environment.
///
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

//! Library integration tests.

use mach::cli::{create_mach, GlobalArgs};
use mach::config::{load_config, ProjectLayout};
use mach::environment::MapEnv;
use mach::MachError;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn error_types_are_public() {
    let err = MachError::UnknownContextKey {
        key: "state_dir".into(),
    };
    assert!(err.to_string().contains("state_dir"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> mach::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn registry_parses_its_own_cli() {
    let mach = create_mach().unwrap();
    let matches = mach
        .cli()
        .try_get_matches_from(["mach", "-q", "bootstrap", "--force"])
        .unwrap();

    let globals = GlobalArgs::from_matches(&matches).unwrap();
    assert!(globals.quiet);

    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "bootstrap");
    assert!(sub.get_flag("force"));
}

#[test]
fn context_hook_resolves_topdir_only() {
    let mut mach = create_mach().unwrap();
    mach.set_topdir(PathBuf::from("/src/servo"));

    assert_eq!(mach.populate_context(None).unwrap(), None);
    assert_eq!(
        mach.populate_context(Some("topdir")).unwrap(),
        Some(PathBuf::from("/src/servo"))
    );
    assert!(matches!(
        mach.populate_context(Some("nope")),
        Err(MachError::UnknownContextKey { .. })
    ));
}

#[test]
fn config_file_drives_layout() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".mach.yml"),
        "virtualenv:\n  directory: python/_venv\n  requirements: [reqs.txt]\n",
    )
    .unwrap();

    let config = load_config(temp.path(), None).unwrap();
    let layout = ProjectLayout::resolve(temp.path(), &config, &MapEnv::new());

    assert_eq!(layout.venv_dir, temp.path().join("python/_venv"));
    assert_eq!(layout.requirements, vec![temp.path().join("reqs.txt")]);
}

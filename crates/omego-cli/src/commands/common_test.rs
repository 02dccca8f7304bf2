use super::*;
use crate::cli::{Cli, Commands};
use clap::Parser;
use std::fs;
use tempfile::tempdir;

fn parse(argv: &[&str]) -> (GlobalArgs, DbArgs) {
    let cli = Cli::try_parse_from(argv).unwrap();
    match cli.command {
        Commands::Db(args) => (cli.global, args),
        other => panic!("expected db command, got {other:?}"),
    }
}

fn env() -> EnvironmentSnapshot {
    EnvironmentSnapshot::from_parts("dbserver", Vec::<(String, String)>::new())
}

#[test]
fn test_command_line_overrides_config_file() {
    let dir = tempdir().unwrap();
    let server = dir.path().join("OMERO.server");
    fs::create_dir_all(&server).unwrap();
    fs::write(
        dir.path().join("omego.yml"),
        format!(
            "serverdir: {}\ndb:\n  name: from_file\n  user: file_user\n",
            server.display()
        ),
    )
    .unwrap();

    let (global, args) = parse(&["omego", "db", "upgrade", "--dbname", "from_cli"]);
    let config = load_config(&global, &args, dir.path(), &env()).unwrap();

    assert_eq!(config.db.name(), "from_cli");
    assert_eq!(config.db.user, "file_user");
    assert_eq!(config.db.host(), "dbserver");
    assert_eq!(config.serverdir.as_deref(), Some(server.as_path()));
}

#[test]
fn test_explicit_config_path() {
    let dir = tempdir().unwrap();
    let server = dir.path().join("server");
    fs::create_dir_all(&server).unwrap();
    let file = dir.path().join("site.yml");
    fs::write(
        &file,
        format!("serverdir: {}\ndb:\n  name: omero\n", server.display()),
    )
    .unwrap();

    let file_arg = file.display().to_string();
    let (global, args) = parse(&["omego", "-c", &file_arg, "db", "init"]);
    let config = load_config(&global, &args, Path::new("/nonexistent"), &env()).unwrap();
    assert_eq!(config.db.name(), "omero");
}

#[test]
fn test_omerosql_placeholders_expanded() {
    let dir = tempdir().unwrap();
    let server = dir.path().display().to_string();
    let (global, args) = parse(&[
        "omego",
        "db",
        "init",
        "--serverdir",
        &server,
        "--dbname",
        "omero_test",
        "--omerosql",
        "%(dbname)s-create.sql",
    ]);

    let config = load_config(&global, &args, dir.path(), &env()).unwrap();
    assert_eq!(config.db.omerosql, "omero_test-create.sql");
}

#[test]
fn test_missing_database_name_rejected() {
    let dir = tempdir().unwrap();
    let server = dir.path().display().to_string();
    let (global, args) = parse(&["omego", "db", "upgrade", "--serverdir", &server]);

    let err = load_config(&global, &args, dir.path(), &env()).unwrap_err();
    assert!(err.to_string().contains("Database name required"));
}

#[test]
fn test_missing_config_file_reported() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.yml").display().to_string();
    let (global, args) = parse(&["omego", "--config", &missing, "db", "upgrade"]);

    let err = load_config(&global, &args, dir.path(), &env()).unwrap_err();
    assert!(format!("{err:#}").contains("missing.yml"));
}

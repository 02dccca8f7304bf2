use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_parse_db_upgrade() {
    let cli = Cli::try_parse_from([
        "omego",
        "-vv",
        "db",
        "upgrade",
        "-n",
        "--serverdir",
        "/opt/omero",
        "--dbname",
        "omero",
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(cli.global.verbose, 2);
    assert_eq!(cli.global.quiet, 0);
    let Commands::Db(args) = cli.command else {
        panic!("expected db command");
    };
    assert_eq!(args.action, DbAction::Upgrade);
    assert!(args.dry_run);
    assert!(!args.managedb);
    assert_eq!(args.serverdir, Some(PathBuf::from("/opt/omero")));
    assert_eq!(args.dbname.as_deref(), Some("omero"));
    assert_eq!(args.output, OutputFormat::Json);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["omego", "db", "dump", "-q", "-c", "site.yml"]).unwrap();
    assert_eq!(cli.global.quiet, 1);
    assert_eq!(cli.global.config, Some(PathBuf::from("site.yml")));
}

#[test]
fn test_unknown_db_action_rejected() {
    assert!(Cli::try_parse_from(["omego", "db", "drop"]).is_err());
}

#[test]
fn test_managedb_help_mentions_upgrade() {
    let mut cmd = Cli::command();
    let db = cmd.find_subcommand_mut("db").expect("db subcommand");
    let help = db.render_help().to_string();
    assert!(
        help.contains("Initialise or upgrade the database as needed"),
        "help: {help}"
    );
}

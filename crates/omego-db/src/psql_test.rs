use super::*;
use chrono::Utc;

fn backend(ci: bool) -> PsqlBackend {
    let db = DbConfig {
        host: Some("host".to_string()),
        name: Some("name".to_string()),
        user: "user".to_string(),
        pass: "pass".to_string(),
        ..DbConfig::default()
    };
    let vars: Vec<(&str, &str)> = if ci {
        vec![("JOB_NAME", "j"), ("BUILD_NUMBER", "1"), ("BUILD_URL", "u")]
    } else {
        vec![]
    };
    let env = EnvironmentSnapshot::from_parts("localhost", vars);
    PsqlBackend::new(&db, &env).unwrap()
}

#[test]
fn test_requires_database_name() {
    let env = EnvironmentSnapshot::from_parts("localhost", Vec::<(String, String)>::new());
    let err = PsqlBackend::new(&DbConfig::default(), &env).unwrap_err();
    assert!(matches!(err, DbError::MissingDatabaseName));
}

#[test]
fn test_psql_command_line() {
    let cmd = backend(false).psql_command(["arg1", "arg2"]);
    assert_eq!(cmd.exe(), "psql");
    assert_eq!(
        cmd.get_args(),
        ["-d", "name", "-h", "host", "-U", "user", "-w", "-A", "-t", "arg1", "arg2"]
    );
    assert_eq!(cmd.get_env()["PGPASSWORD"], "pass");
    assert!(!cmd.get_env().contains_key("BUILD_ID"));
}

#[test]
fn test_ci_job_env_propagated() {
    let cmd = backend(true).psql_command(["-c", "\\conninfo"]);
    assert_eq!(cmd.get_env()["BUILD_ID"], "DONT_KILL_ME");
}

#[test]
fn test_password_not_on_command_line() {
    let cmd = backend(false).psql_command(["-c", CURRENT_VERSION_QUERY]);
    assert!(!cmd.display().contains("pass "));
    assert!(!cmd.get_args().iter().any(|a| a == "pass"));
}

#[test]
fn test_dump_command_line() {
    let cmd = backend(false).dump_command(Path::new("out.pgdump"));
    assert_eq!(cmd.exe(), "pg_dump");
    assert_eq!(
        cmd.get_args(),
        ["-d", "name", "-h", "host", "-U", "user", "-w", "-Fc", "-f", "out.pgdump"]
    );
}

#[test]
fn test_parse_version_rows() {
    let v = parse_version_rows("OMERO4.4|0\n").unwrap();
    assert_eq!(v.as_str(), "OMERO4.4__0");

    let v = parse_version_rows("\nOMERO5.1DEV|3\n\n").unwrap();
    assert_eq!(v.as_str(), "OMERO5.1DEV__3");
}

#[test]
fn test_parse_version_rows_wrong_count() {
    let err = parse_version_rows("").unwrap_err();
    assert!(matches!(err, DbError::UnexpectedRows { expected: 1, found: 0 }));

    let err = parse_version_rows("OMERO4.4|0\nOMERO5.0|0\n").unwrap_err();
    assert!(matches!(err, DbError::UnexpectedRows { found: 2, .. }));
}

#[test]
fn test_parse_version_rows_malformed() {
    let err = parse_version_rows("OMERO4.4").unwrap_err();
    assert!(matches!(err, DbError::InvalidVersion { .. }));

    let err = parse_version_rows("garbage|0").unwrap_err();
    assert!(matches!(err, DbError::InvalidVersion { .. }));
}

#[test]
fn test_dump_file_name() {
    let now = Utc.with_ymd_and_hms(2015, 3, 7, 14, 5, 9).unwrap();
    assert_eq!(
        dump_file_name("omero", &now),
        "omero-database-omero-20150307-140509-000000.pgdump"
    );
}

use super::*;
use tempfile::tempdir;

fn env() -> EnvironmentSnapshot {
    EnvironmentSnapshot::from_parts("localhost", Vec::<(String, String)>::new())
}

#[test]
fn test_init_script_masks_only_root_password() {
    // Defaults from PATH lookup: the executable and the password are both "omero"
    let cli = OmeroCli {
        python: "python".to_string(),
        bin: "omero".to_string(),
        child_env: HashMap::new(),
    };
    let cmd = cli.init_script_command(Path::new("omero.sql"), "omero");
    assert_eq!(
        cmd.display(),
        "python omero db script -f omero.sql   ****"
    );
    assert_eq!(cmd.get_args().last().map(String::as_str), Some("omero"));
}

#[tokio::test]
async fn test_locate_fails_without_interpreter() {
    let dir = tempdir().unwrap();
    let err = OmeroCli::locate("omego-no-such-python", dir.path(), &env())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::OmeroCliUnavailable { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn test_locate_prefers_server_bin() {
    let dir = tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    std::fs::create_dir_all(&bin_dir).unwrap();
    std::fs::write(bin_dir.join("omero"), "echo 5.0.0\n").unwrap();

    // `sh bin/omero version` stands in for `python bin/omero version`
    let cli = OmeroCli::locate("sh", dir.path(), &env()).await.unwrap();
    assert_eq!(cli.bin(), bin_dir.join("omero").display().to_string());
}

#[cfg(unix)]
#[tokio::test]
async fn test_generate_init_script_arguments() {
    let dir = tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    std::fs::create_dir_all(&bin_dir).unwrap();
    // Records its arguments, writes the file named after -f
    std::fs::write(
        bin_dir.join("omero"),
        "if [ \"$1\" = db ]; then printf '%s,' \"$@\" > \"$4\"; fi\n",
    )
    .unwrap();

    let cli = OmeroCli::locate("sh", dir.path(), &env()).await.unwrap();
    let target = dir.path().join("omero.sql");
    cli.generate_init_script(&target, "rootpw").await.unwrap();

    let recorded = std::fs::read_to_string(&target).unwrap();
    assert_eq!(
        recorded,
        format!("db,script,-f,{},,,rootpw,", target.display())
    );
}

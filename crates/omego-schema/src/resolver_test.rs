use super::*;
use crate::discovery::UpgradeEdge;

fn v(token: &str) -> SchemaVersion {
    SchemaVersion::parse(token).unwrap()
}

fn script(from: &str, to: &str) -> PathBuf {
    PathBuf::from(format!("{to}/{from}.sql"))
}

fn graph(pairs: &[(&str, &str)]) -> VersionGraph {
    let edges: Vec<UpgradeEdge> = pairs
        .iter()
        .map(|(from, to)| UpgradeEdge {
            from: v(from),
            to: v(to),
            script: script(from, to),
        })
        .collect();
    VersionGraph::new(Vec::new(), &edges)
}

/// 3.0 -> 4.0, 3.0 -> 4.4, 4.0 -> 4.4, 4.0 -> 5.0, 4.4 -> 5.0, 5.0 -> 5.1
fn release_graph() -> VersionGraph {
    graph(&[
        ("OMERO3.0__0", "OMERO4.0__0"),
        ("OMERO3.0__0", "OMERO4.4__0"),
        ("OMERO4.0__0", "OMERO4.4__0"),
        ("OMERO4.0__0", "OMERO5.0__0"),
        ("OMERO4.4__0", "OMERO5.0__0"),
        ("OMERO5.0__0", "OMERO5.1__0"),
    ])
}

fn scripts_of(path: &UpgradePath) -> Vec<PathBuf> {
    path.scripts().map(Path::to_path_buf).collect()
}

#[test]
fn test_resolve_single_step() {
    let path = resolve_path(&release_graph(), &v("OMERO5.0__0")).unwrap();
    assert_eq!(scripts_of(&path), [script("OMERO5.0__0", "OMERO5.1__0")]);
}

#[test]
fn test_resolve_prefers_direct_jump() {
    let path = resolve_path(&release_graph(), &v("OMERO4.0__0")).unwrap();
    assert_eq!(
        scripts_of(&path),
        [
            script("OMERO4.0__0", "OMERO5.0__0"),
            script("OMERO5.0__0", "OMERO5.1__0"),
        ]
    );
}

#[test]
fn test_resolve_prefers_larger_first_jump() {
    let path = resolve_path(&release_graph(), &v("OMERO3.0__0")).unwrap();
    assert_eq!(
        scripts_of(&path),
        [
            script("OMERO3.0__0", "OMERO4.4__0"),
            script("OMERO4.4__0", "OMERO5.0__0"),
            script("OMERO5.0__0", "OMERO5.1__0"),
        ]
    );
    let steps = path.steps();
    assert_eq!(steps[0].from, v("OMERO3.0__0"));
    assert_eq!(steps[0].to, v("OMERO4.4__0"));
    assert_eq!(steps[2].to, v("OMERO5.1__0"));
}

#[test]
fn test_resolve_backtracks_from_dead_end() {
    // 4.4 is a dead end, so the search falls back to the smaller jump to 4.0
    let graph = graph(&[
        ("OMERO3.0__0", "OMERO4.0__0"),
        ("OMERO3.0__0", "OMERO4.4__0"),
        ("OMERO4.0__0", "OMERO5.0__0"),
    ]);
    let path = resolve_path(&graph, &v("OMERO3.0__0")).unwrap();
    assert_eq!(
        scripts_of(&path),
        [
            script("OMERO3.0__0", "OMERO4.0__0"),
            script("OMERO4.0__0", "OMERO5.0__0"),
        ]
    );
}

#[test]
fn test_resolve_direct_to_latest_wins() {
    let graph = graph(&[
        ("OMERO4.4__0", "OMERO5.0__0"),
        ("OMERO4.4__0", "OMERO5.1__0"),
        ("OMERO5.0__0", "OMERO5.1__0"),
    ]);
    let path = resolve_path(&graph, &v("OMERO4.4__0")).unwrap();
    assert_eq!(scripts_of(&path), [script("OMERO4.4__0", "OMERO5.1__0")]);
}

#[test]
fn test_resolve_through_dev_versions() {
    let graph = graph(&[
        ("OMERO5.0__0", "OMERO5.1DEV__0"),
        ("OMERO5.1DEV__0", "OMERO5.1DEV__1"),
        ("OMERO5.1DEV__1", "OMERO5.1__0"),
    ]);
    let path = resolve_path(&graph, &v("OMERO5.0__0")).unwrap();
    assert_eq!(path.len(), 3);
    assert_eq!(path.steps()[2].to, v("OMERO5.1__0"));
}

#[test]
fn test_already_latest_is_empty() {
    let path = resolve_path(&release_graph(), &v("OMERO5.1__0")).unwrap();
    assert!(path.is_empty());
}

#[test]
fn test_unreachable_version_named() {
    // 4.2 has no outgoing scripts
    let graph = VersionGraph::new(
        vec![v("OMERO4.2__0")],
        &[UpgradeEdge {
            from: v("OMERO4.4__0"),
            to: v("OMERO5.0__0"),
            script: script("OMERO4.4__0", "OMERO5.0__0"),
        }],
    );
    let err = resolve_path(&graph, &v("OMERO4.2__0")).unwrap_err();
    match &err {
        SchemaError::NoUpgradePath { from, to } => {
            assert_eq!(from, "OMERO4.2__0");
            assert_eq!(to, "OMERO5.0__0");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("OMERO4.2__0"));
}

#[test]
fn test_dead_end_chain_fails() {
    let graph = graph(&[
        ("OMERO4.0__0", "OMERO4.4__0"),
        ("OMERO5.0__0", "OMERO5.1__0"),
    ]);
    let err = resolve_path(&graph, &v("OMERO4.0__0")).unwrap_err();
    assert!(matches!(err, SchemaError::NoUpgradePath { .. }));
}

#[test]
fn test_unknown_version() {
    let err = resolve_path(&release_graph(), &v("OMERO2__0")).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownVersion { .. }));
}

#[test]
fn test_downgrade_cycle_terminates() {
    let graph = graph(&[
        ("OMERO4.0__0", "OMERO4.4__0"),
        ("OMERO4.4__0", "OMERO4.0__0"),
        ("OMERO3.0__0", "OMERO4.0__0"),
        ("OMERO3.0__0", "OMERO5.0__0"),
    ]);
    // From 4.0 the only exits lead back and forth between 4.0 and 4.4
    let err = resolve_path(&graph, &v("OMERO4.0__0")).unwrap_err();
    assert!(matches!(err, SchemaError::NoUpgradePath { .. }));
}

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::path::Path;

mod common;
use common::gw;

fn scaffold(root: &Path) {
    let tpl = root.join("deployment-template");
    for c in ["ngdac-profile", "sci-profile", "raw-trajectory"] {
        let d = tpl.join("config").join(c);
        fs::create_dir_all(&d).unwrap();
        fs::write(d.join("sensor_defs.json"), "{}").unwrap();
    }
    fs::create_dir_all(tpl.join("data/out/nc/ngdac-profile/rt")).unwrap();

    let dep = root.join("deployments/2023/ru28-20230601T1500");
    fs::create_dir_all(dep.join("config/sci-profile")).unwrap();
    fs::create_dir_all(dep.join("data/out/nc/sci-profile")).unwrap();
}

#[test]
fn test_dry_run_changes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    scaffold(tmp.path());
    let parent = tmp.path().to_string_lossy().to_string();

    gw().args(["reformat", "--parent-dir", &parent, "--year", "2023", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("mkdir").and(contains("dry run")));

    assert!(
        !tmp.path()
            .join("deployments/2023/ru28-20230601T1500/config/ngdac-profile")
            .exists()
    );
}

#[test]
fn test_reformat_applies_changes() {
    let tmp = tempfile::tempdir().unwrap();
    scaffold(tmp.path());
    let parent = tmp.path().to_string_lossy().to_string();

    gw().args(["reformat", "--parent-dir", &parent, "--year", "2023"])
        .assert()
        .success()
        .stdout(contains("applied"));

    let dep = tmp.path().join("deployments/2023/ru28-20230601T1500");
    assert!(dep.join("config/ngdac-profile/sensor_defs.json").is_file());
    assert!(dep.join("data/out/nc/ngdac-profile/rt").is_dir());
    assert!(dep.join("data/out/nc/sci-profile/rt/qc_queue").is_dir());
}

#[test]
fn test_unknown_year_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let parent = tmp.path().to_string_lossy().to_string();

    gw().args(["reformat", "--parent-dir", &parent, "--year", "1999"])
        .assert()
        .success()
        .stdout(contains("Nothing to update"));
}

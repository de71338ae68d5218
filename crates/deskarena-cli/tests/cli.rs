//! CLI argument-parsing and read-only-subcommand smoke tests, driven
//! through the real built binary.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn no_subcommand_prints_usage_and_exits_nonzero() {
    Command::cargo_bin("deskarena").unwrap().assert().failure().stderr(contains("Usage"));
}

#[test]
fn help_lists_all_three_subcommands() {
    Command::cargo_bin("deskarena")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("run-experiments"))
        .stdout(contains("run-worker"))
        .stdout(contains("list-tasks"));
}

#[test]
fn list_tasks_partitions_and_prints_one_line_per_task() {
    let dir = tempfile::tempdir().unwrap();
    let meta_path = dir.path().join("test_all.json");
    std::fs::write(&meta_path, r#"{"chrome": ["t1", "t2", "t3"], "vlc": ["t4"]}"#).unwrap();

    Command::cargo_bin("deskarena")
        .unwrap()
        .args(["list-tasks", "--test-all-meta-path", meta_path.to_str().unwrap(), "--num-workers", "2"])
        .assert()
        .success()
        .stdout(contains("0\tchrome\tt1"))
        .stdout(contains("1\tvlc\tt4"));
}

#[test]
fn list_tasks_domain_filter_excludes_other_domains() {
    let dir = tempfile::tempdir().unwrap();
    let meta_path = dir.path().join("test_all.json");
    std::fs::write(&meta_path, r#"{"chrome": ["t1"], "vlc": ["t2"]}"#).unwrap();

    let output = Command::cargo_bin("deskarena")
        .unwrap()
        .args(["list-tasks", "--test-all-meta-path", meta_path.to_str().unwrap(), "--domain", "vlc", "--num-workers", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    assert!(!stdout.contains("chrome"));
    assert!(stdout.contains("vlc\tt2"));
}

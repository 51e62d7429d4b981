//! CLI integration: `svfs purge` over a tree of leftover snapshots, and
//! `svfs config` output.

mod common;

use std::fs;
use std::time::{Duration, SystemTime};

use common::run_svfs;
use filetime::FileTime;

fn seed_tree(root: &std::path::Path) {
    fs::write(root.join("report.csv"), b"live data").unwrap();
    fs::write(root.join("report.csv.backup.1"), b"old v1").unwrap();
    fs::write(root.join("report.csv.backup.2"), b"old v2").unwrap();
    let nested = root.join("nested");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("notes.md.backup.7"), b"leftover").unwrap();
    // Near-misses that must survive a purge.
    fs::write(root.join("report.csv.backup"), b"no count").unwrap();
    fs::write(root.join("archive.bak.3"), b"different suffix").unwrap();
}

#[test]
fn purge_deletes_only_snapshot_named_files() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());

    let result = run_svfs(&["purge", dir.path().to_str().unwrap()]);
    assert!(result.status.success(), "stderr: {}", result.stderr);
    assert!(result.stdout.contains("deleted 3 snapshot file(s)"));

    assert!(!dir.path().join("report.csv.backup.1").exists());
    assert!(!dir.path().join("report.csv.backup.2").exists());
    assert!(!dir.path().join("nested/notes.md.backup.7").exists());

    assert!(dir.path().join("report.csv").exists());
    assert!(dir.path().join("report.csv.backup").exists());
    assert!(dir.path().join("archive.bak.3").exists());
}

#[test]
fn purge_dry_run_deletes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());

    let result = run_svfs(&["purge", "--dry-run", dir.path().to_str().unwrap()]);
    assert!(result.status.success(), "stderr: {}", result.stderr);
    assert!(result.stdout.contains("would delete 3 snapshot file(s)"));

    assert!(dir.path().join("report.csv.backup.1").exists());
    assert!(dir.path().join("report.csv.backup.2").exists());
    assert!(dir.path().join("nested/notes.md.backup.7").exists());
}

#[test]
fn purge_age_filter_spares_young_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let old = dir.path().join("a.backup.1");
    let young = dir.path().join("b.backup.1");
    fs::write(&old, b"old").unwrap();
    fs::write(&young, b"young").unwrap();

    // Backdate one snapshot by an hour.
    let hour_ago = SystemTime::now() - Duration::from_secs(3_600);
    filetime::set_file_mtime(&old, FileTime::from_system_time(hour_ago)).unwrap();

    let result = run_svfs(&[
        "purge",
        "--older-than-secs",
        "1800",
        dir.path().to_str().unwrap(),
    ]);
    assert!(result.status.success(), "stderr: {}", result.stderr);

    assert!(!old.exists());
    assert!(young.exists());
    assert!(result.stdout.contains("1 skipped (too young)"));
}

#[test]
fn purge_json_output_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());

    let result = run_svfs(&["--json", "purge", dir.path().to_str().unwrap()]);
    assert!(result.status.success(), "stderr: {}", result.stderr);

    let value: serde_json::Value = serde_json::from_str(&result.stdout).unwrap();
    assert_eq!(value["files_deleted"], 3);
    assert_eq!(value["files_failed"], 0);
    assert_eq!(value["dry_run"], false);
}

#[test]
fn purge_rejects_nonexistent_root() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-here");

    let result = run_svfs(&["purge", missing.to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(result.stderr.contains("SVFS-1001"));
}

#[test]
fn config_defaults_print_reference_values() {
    let result = run_svfs(&["config", "--defaults"]);
    assert!(result.status.success(), "stderr: {}", result.stderr);
    assert!(result.stdout.contains("[retention]"));
    assert!(result.stdout.contains("max_snapshot_age_secs = 50"));
    assert!(result.stdout.contains("min_sweep_interval_secs = 10"));
    assert!(result.stdout.contains("initial_capacity = 5"));
}

#[test]
fn config_json_mode_emits_json() {
    let result = run_svfs(&["--json", "config", "--defaults"]);
    assert!(result.status.success(), "stderr: {}", result.stderr);
    let value: serde_json::Value = serde_json::from_str(&result.stdout).unwrap();
    assert_eq!(value["retention"]["max_snapshot_age_secs"], 50);
    assert_eq!(value["snapshot"]["suffix"], ".backup");
}

#[test]
fn config_loads_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("svfs.toml");
    fs::write(&cfg, "[retention]\nmax_snapshot_age_secs = 240\n").unwrap();

    let result = run_svfs(&["--config", cfg.to_str().unwrap(), "config"]);
    assert!(result.status.success(), "stderr: {}", result.stderr);
    assert!(result.stdout.contains("max_snapshot_age_secs = 240"));
}

mod common;

use std::fs;
use std::path::PathBuf;

use common::*;
use predicates::prelude::*;

#[test]
fn test_delete_directory_tree() {
    let temp = create_test_tree();
    let root = temp.path();

    run_delete(root, &["modules"])
        .success()
        .stdout(predicate::str::contains("Deleted 4 files and 4 directories"));

    assert!(!root.join("modules").exists());
    assert!(!root.join(".bkp").exists());
}

#[test]
fn test_delete_two_files() {
    let temp = tempfile::TempDir::new().unwrap();
    let d = temp.path().join("d");
    fs::create_dir(&d).unwrap();
    fs::write(d.join("x.txt"), "x").unwrap();
    fs::write(d.join("y.txt"), "y").unwrap();

    run_delete(temp.path(), &["d"]).success();

    assert!(!d.exists());
    assert!(!temp.path().join(".bkp/d").exists());
}

#[test]
fn test_delete_single_file() {
    let temp = create_test_tree();
    let root = temp.path();

    run_delete(root, &["modules/README"]).success();

    assert!(!root.join("modules/README").exists());
    assert!(root.join("modules/base/module.xml").exists());
    assert!(!root.join("modules/.bkp").exists());
}

#[test]
fn test_delete_multiple_targets() {
    let temp = create_test_tree();
    let root = temp.path();
    fs::create_dir(root.join("bundles")).unwrap();
    fs::write(root.join("bundles/x.bundle"), "x").unwrap();

    run_delete(root, &["modules", "bundles"]).success();

    assert!(!root.join("modules").exists());
    assert!(!root.join("bundles").exists());
    assert!(!root.join(".bkp").exists());
}

#[test]
fn test_exclude_keeps_matching_entries() {
    let temp = create_test_tree();
    let root = temp.path();

    run_delete(root, &["modules", "--exclude", "^README$", "-x", r"^b\.jar$"]).success();

    assert_eq!(
        list_tree(&root.join("modules")),
        vec![
            PathBuf::from("README"),
            PathBuf::from("base"),
            PathBuf::from("base/lib"),
            PathBuf::from("base/lib/b.jar"),
        ]
    );
    assert!(!root.join(".bkp").exists());
}

#[test]
fn test_missing_target_is_noop() {
    let temp = create_test_tree();
    let root = temp.path();

    run_delete(root, &["does-not-exist"])
        .success()
        .stdout(predicate::str::contains("Nothing to delete"));
}

#[test]
fn test_second_delete_is_noop() {
    let temp = create_test_tree();
    let root = temp.path();

    run_delete(root, &["modules"]).success();
    run_delete(root, &["modules"]).success();

    assert!(!root.join("modules").exists());
    assert!(!root.join(".bkp").exists());
}

#[test]
fn test_dry_run_changes_nothing() {
    let temp = create_test_tree();
    let root = temp.path();
    let before = list_tree(root);

    run_cmd(root, "delete", &["modules", "--dry-run"])
        .success()
        .stdout(predicate::str::contains("DRY RUN"))
        .stdout(predicate::str::contains("would be deleted"));

    assert_eq!(list_tree(root), before);
}

#[test]
fn test_dry_run_reports_filtered_entries() {
    let temp = create_test_tree();
    let root = temp.path();

    run_cmd(root, "delete", &["modules", "-n", "-x", "^README$"])
        .success()
        .stdout(predicate::str::contains("kept by filter"));

    assert!(root.join("modules/base/lib/a.jar").exists());
}

#[test]
fn test_without_confirmation_on_non_tty_is_cancelled() {
    let temp = create_test_tree();
    let root = temp.path();
    let before = list_tree(root);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("txn-delete");
    cmd.arg("delete")
        .arg("modules")
        .current_dir(root)
        .env("NO_COLOR", "1")
        .write_stdin("y\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cancelled"));

    assert_eq!(list_tree(root), before);
}

#[test]
fn test_stale_backup_aborts_without_changes() {
    let temp = create_test_tree();
    let root = temp.path();
    fs::create_dir_all(root.join(".bkp/modules")).unwrap();
    fs::write(root.join(".bkp/modules/leftover"), "old").unwrap();
    let before = list_tree(root);

    run_delete(root, &["modules"])
        .failure()
        .stderr(predicate::str::contains("Stale backup"))
        .stderr(predicate::str::contains("Nothing was deleted"));

    assert_eq!(list_tree(root), before);
}

#[test]
fn test_prepare_error_is_reported_once() {
    let temp = create_test_tree();
    let root = temp.path();
    fs::create_dir_all(root.join(".bkp/modules")).unwrap();

    let output = run_delete(root, &["modules"]).failure().get_output().clone();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(stderr.matches("Stale backup present").count(), 1, "{}", stderr);
}

#[test]
fn test_stale_backup_of_one_target_protects_the_batch() {
    let temp = create_test_tree();
    let root = temp.path();
    fs::create_dir(root.join("bundles")).unwrap();
    fs::write(root.join("bundles/x.bundle"), "x").unwrap();
    fs::create_dir_all(root.join(".bkp/bundles")).unwrap();
    let before = list_tree(root);

    run_delete(root, &["modules", "bundles"]).failure();

    assert_eq!(list_tree(root), before);
}

#[test]
fn test_custom_backup_dir() {
    let temp = create_test_tree();
    let root = temp.path();
    fs::create_dir_all(root.join(".bkp/modules")).unwrap();

    // Stale .bkp is irrelevant when staging elsewhere
    run_delete(root, &["modules", "--backup-dir", ".staging"]).success();

    assert!(!root.join("modules").exists());
    assert!(!root.join(".staging").exists());
    assert!(root.join(".bkp/modules").exists());
}

#[test]
fn test_config_file_is_applied() {
    let temp = create_test_tree();
    let root = temp.path();
    fs::write(
        root.join("txn-delete.toml"),
        "exclude = [\"^README$\"]\nconfirm = false\n",
    )
    .unwrap();

    // confirm = false: no --yes needed even on a non-tty stdin
    run_cmd(root, "delete", &["modules"]).success();

    assert_eq!(list_tree(&root.join("modules")), vec![PathBuf::from("README")]);
}

#[test]
fn test_explicit_config_path() {
    let temp = create_test_tree();
    let root = temp.path();
    fs::write(root.join("custom.toml"), "exclude = [\"\\\\.jar$\"]\n").unwrap();

    run_delete(root, &["modules", "--config", "custom.toml"]).success();

    assert!(root.join("modules/base/lib/a.jar").exists());
    assert!(!root.join("modules/README").exists());
}

#[test]
fn test_invalid_config_fails() {
    let temp = create_test_tree();
    let root = temp.path();
    fs::write(root.join("txn-delete.toml"), "backup-dir = 42\n").unwrap();

    run_delete(root, &["modules"])
        .failure()
        .stderr(predicate::str::contains("backup-dir"));

    assert!(root.join("modules/README").exists());
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_is_unlinked_not_followed() {
    let temp = create_test_tree();
    let root = temp.path();
    std::os::unix::fs::symlink(root.join("modules"), root.join("link")).unwrap();

    run_delete(root, &["link"]).success();

    assert!(!root.join("link").exists());
    assert!(root.join("modules/base/lib/a.jar").exists());
}

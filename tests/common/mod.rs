//! Shared fixtures for txn-delete integration tests
//!
//! These tests build real directory trees in temp dirs and run the binary
//! against them.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a workspace with a `modules` tree:
///
/// ```text
/// modules/
///   README
///   base/module.xml
///   base/lib/a.jar
///   base/lib/b.jar
///   empty/
/// ```
#[allow(unused)]
pub fn create_test_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let modules = temp.path().join("modules");

    fs::create_dir_all(modules.join("base/lib")).unwrap();
    fs::create_dir_all(modules.join("empty")).unwrap();
    fs::write(modules.join("README"), "read me").unwrap();
    fs::write(modules.join("base/module.xml"), "<module/>").unwrap();
    fs::write(modules.join("base/lib/a.jar"), "a").unwrap();
    fs::write(modules.join("base/lib/b.jar"), "b").unwrap();

    temp
}

/// Lists every path below `root`, relative and sorted.
#[allow(unused)]
pub fn list_tree(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            out.push(path.strip_prefix(root).unwrap().to_path_buf());
            if path.is_dir() {
                walk(root, &path, out);
            }
        }
    }

    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}

/// Runs `txn-delete <subcommand> <args>` in `dir`.
pub fn run_cmd(dir: &Path, subcommand: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("txn-delete");
    cmd.arg(subcommand)
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1");

    cmd.assert()
}

/// Runs a confirmed delete in `dir`.
#[allow(unused)]
pub fn run_delete(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut full = vec!["--yes"];
    full.extend_from_slice(args);
    run_cmd(dir, "delete", &full)
}

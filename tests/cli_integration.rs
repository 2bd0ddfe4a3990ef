//! CLI integration tests for trellis.
//!
//! These tests drive the binary through the offline workflow: creating a
//! project, editing its objects and dependencies, validating it and printing
//! its tree. Nothing here touches the network.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the trellis binary command.
fn trellis() -> Command {
    Command::cargo_bin("trellis").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Create a project named `hello` under `tmp` and return its root.
fn init_hello(tmp: &TempDir) -> std::path::PathBuf {
    trellis()
        .args(["init", "hello", "--version", "1.0.0"])
        .current_dir(tmp.path())
        .assert()
        .success();
    tmp.path().join("hello")
}

fn manifest(root: &Path) -> String {
    fs::read_to_string(root.join("project.toml")).unwrap()
}

// ============================================================================
// trellis init
// ============================================================================

#[test]
fn test_init_creates_project() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    for dir in ["apps", "libs", "tests", "include", "dependencies"] {
        assert!(root.join(dir).is_dir(), "{} missing", dir);
    }

    let content = manifest(&root);
    assert!(content.starts_with("#trellis::generated"));
    assert!(content.contains("project = \"hello\""));
    assert!(content.contains("version = \"1.0.0\""));
}

#[test]
fn test_init_with_explicit_path() {
    let tmp = temp_dir();
    let root = tmp.path().join("nested").join("here");

    trellis()
        .args(["init", "hello", "--path"])
        .arg(&root)
        .assert()
        .success();

    assert!(root.join("project.toml").is_file());
    assert!(manifest(&root).contains("version = \"0.0.0\""));
}

#[test]
fn test_init_fails_if_manifest_exists() {
    let tmp = temp_dir();
    init_hello(&tmp);

    trellis()
        .args(["init", "hello"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// trellis add / update / remove
// ============================================================================

#[test]
fn test_add_objects() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "app", "greeter", "--compile-options", "-O2;-Wall"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args(["add", "lib", "util", "--lang", "C"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args(["add", "test", "smoke", "--command", "./greeter --check"])
        .current_dir(&root)
        .assert()
        .success();

    let content = manifest(&root);
    assert!(content.contains("[[apps]]"));
    assert!(content.contains("name = \"greeter\""));
    assert!(content.contains("lang = \"CXX\""));
    assert!(content.contains("[[libraries]]"));
    assert!(content.contains("[[tests]]"));
    assert!(content.contains("command = \"./greeter --check\""));

    assert!(root.join("apps/greeter/greeter.cpp").is_file());
    assert!(root.join("libs/util/util.c").is_file());
    assert!(root.join("include/util/util.h").is_file());
}

#[test]
fn test_add_from_subdirectory_finds_manifest() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "lib", "util"])
        .current_dir(root.join("libs"))
        .assert()
        .success();

    assert!(manifest(&root).contains("name = \"util\""));
}

#[test]
fn test_add_invalid_object_name() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "app", "my-app"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid object name `my-app`"));
}

#[test]
fn test_add_dependency() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "app", "greeter"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args([
            "add",
            "dep",
            "greeter",
            "https://github.com/larryk85/dune",
            "--release",
            ">= 2.0, < 3.0",
        ])
        .current_dir(&root)
        .assert()
        .success();

    let content = manifest(&root);
    assert!(content.contains("[[apps.depends]]"));
    assert!(content.contains("from = \"larryk85/dune\""));
    assert!(content.contains("release = \">= 2.0, < 3.0\""));
}

#[test]
fn test_add_dependency_to_missing_object() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "dep", "ghost", "larryk85/dune"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("object `ghost` does not exist"));
}

#[test]
fn test_add_sibling_dependency_requires_library() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "app", "greeter"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args(["add", "dep", "greeter", "--name", "util"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown library `util`"));
}

#[test]
fn test_update_dependency_and_object() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "lib", "util"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args(["add", "dep", "util", "larryk85/dune", "--release", "2.0"])
        .current_dir(&root)
        .assert()
        .success();

    trellis()
        .args(["update", "dep", "dune", "--tag", "v2.2.4"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args(["update", "lib", "util", "--link-options", "-lm"])
        .current_dir(&root)
        .assert()
        .success();

    let content = manifest(&root);
    assert!(content.contains("tag = \"v2.2.4\""));
    assert!(!content.contains("release = \"2.0\""));
    assert!(content.contains("link_options = \"-lm\""));
}

#[test]
fn test_remove_dependency_and_object() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "app", "greeter"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args(["add", "dep", "greeter", "larryk85/dune"])
        .current_dir(&root)
        .assert()
        .success();

    trellis()
        .args(["remove", "dep", "dune"])
        .current_dir(&root)
        .assert()
        .success();
    assert!(!manifest(&root).contains("larryk85/dune"));

    trellis()
        .args(["remove", "app", "greeter"])
        .current_dir(&root)
        .assert()
        .success();
    assert!(!manifest(&root).contains("greeter"));

    trellis()
        .args(["remove", "lib", "greeter"])
        .current_dir(&root)
        .assert()
        .failure();
}

// ============================================================================
// trellis validate
// ============================================================================

#[test]
fn test_validate_offline() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["validate", "--offline"])
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello is a valid project"));
}

#[test]
fn test_validate_reports_manifest_errors() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("project.toml"),
        "project = \"hello\"\nversion = \"1.0.0\"\ncolour = \"blue\"\n",
    )
    .unwrap();

    trellis()
        .args(["validate", "--offline", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_validate_without_project() {
    let tmp = temp_dir();

    trellis()
        .args(["validate", "--offline"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("trellis init"));
}

#[test]
fn test_validate_print_normalizes_github_urls() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("project.toml"),
        r#"project = "hello"
version = "1.0.0"

[[apps]]
name = "greeter"
lang = "C"

[[apps.depends]]
from = "https://github.com/larryk85/dune.git"
"#,
    )
    .unwrap();

    trellis()
        .args(["validate", "--offline", "--print"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("from = \"larryk85/dune\""));
}

// ============================================================================
// trellis tree
// ============================================================================

#[test]
fn test_tree_lists_objects_and_dependencies() {
    let tmp = temp_dir();
    let root = init_hello(&tmp);

    trellis()
        .args(["add", "lib", "util", "--lang", "C"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args(["add", "app", "greeter"])
        .current_dir(&root)
        .assert()
        .success();
    trellis()
        .args(["add", "dep", "greeter", "--name", "util"])
        .current_dir(&root)
        .assert()
        .success();

    trellis()
        .args(["-C"])
        .arg(&root)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("hello v1.0.0\n"))
        .stdout(predicate::str::contains("app greeter"))
        .stdout(predicate::str::contains("util (sibling)"))
        .stdout(predicate::str::contains("lib util"));
}

// ============================================================================
// trellis completions
// ============================================================================

#[test]
fn test_completions_bash() {
    trellis()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trellis"));
}

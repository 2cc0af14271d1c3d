//! CLI integration tests for fmq-recipe.
//!
//! These tests drive the binary against a small finalmq-shaped source tree.
//! The `create` tests substitute a shell script for cmake through the project
//! config, so they only run on unix.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the fmq-recipe binary command, isolated from the user's config.
fn fmq_recipe(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fmq-recipe").unwrap();
    cmd.env("FMQ_RECIPE_HOME", home).arg("--color").arg("never");
    cmd
}

/// Create a temporary source tree with the files the recipe exports.
fn source_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let files = [
        ("CMakeLists.txt", "cmake_minimum_required(VERSION 3.21)\nproject(finalmq CXX)\n"),
        ("inc/finalmq/helpers/Utils.h", "#pragma once\n"),
        ("src/helpers/Utils.cpp", "#include \"finalmq/helpers/Utils.h\"\n"),
        ("README.md", "# finalmq\n"),
    ];
    for (relative, content) in files {
        let path = tmp.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    tmp
}

fn home(tree: &TempDir) -> PathBuf {
    tree.path().join(".home")
}

const LINUX: [&str; 4] = ["-s", "os=Linux", "-s", "arch=x86_64"];

// ============================================================================
// fmq-recipe inspect
// ============================================================================

#[test]
fn test_inspect_linux_defaults() {
    let tree = source_tree();

    fmq_recipe(&home(&tree))
        .arg("inspect")
        .args(LINUX)
        .current_dir(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("finalmq/1.0.0"))
        .stdout(predicate::str::contains("shared      True"))
        .stdout(predicate::str::contains("fPIC        False"))
        .stdout(predicate::str::contains("openssl/1.1.1t"))
        .stdout(predicate::str::contains("libs: finalmq"));
}

#[test]
fn test_inspect_windows_omits_fpic() {
    let tree = source_tree();

    fmq_recipe(&home(&tree))
        .args(["inspect", "-s", "os=Windows", "-s", "arch=x86_64"])
        .current_dir(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fPIC").not())
        .stdout(predicate::str::contains("Visual Studio 17 2022 (multi-config)"));
}

#[test]
fn test_inspect_json_lists_libuuid_once() {
    let tree = source_tree();

    let output = fmq_recipe(&home(&tree))
        .args(["inspect", "--format", "json"])
        .args(LINUX)
        .arg("--source")
        .arg(tree.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["requires"],
        serde_json::json!(["openssl/1.1.1t", "libuuid/1.0.3"])
    );
    assert_eq!(json["options"]["fPIC"], false);
    assert_eq!(json["libs"], serde_json::json!(["finalmq"]));
}

#[test]
fn test_inspect_option_override() {
    let tree = source_tree();

    fmq_recipe(&home(&tree))
        .args(["inspect", "-o", "shared=False"])
        .args(LINUX)
        .current_dir(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("shared      False"));
}

#[test]
fn test_unknown_setting_value_is_a_configure_error() {
    let tree = source_tree();

    fmq_recipe(&home(&tree))
        .args(["inspect", "-s", "os=Plan9"])
        .current_dir(tree.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configure phase failed"))
        .stderr(predicate::str::contains("Plan9"));
}

#[test]
fn test_unknown_option_is_a_configure_error() {
    let tree = source_tree();

    fmq_recipe(&home(&tree))
        .args(["inspect", "-o", "lto=True"])
        .args(LINUX)
        .current_dir(tree.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown option `lto`"));
}

#[test]
fn test_broken_project_config_is_a_configure_error() {
    let tree = source_tree();
    let config_dir = tree.path().join(".fmq-recipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[settings]\nos = \"Windows\"\nbuild_type = Debug\n",
    )
    .unwrap();

    fmq_recipe(&home(&tree))
        .arg("inspect")
        .current_dir(tree.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configure phase failed"))
        .stderr(predicate::str::contains("invalid config file"));
}

#[test]
fn test_misspelled_config_section_is_rejected() {
    let tree = source_tree();
    let home = home(&tree);
    fs::create_dir_all(&home).unwrap();
    fs::write(home.join("config.toml"), "[setings]\nos = \"Windows\"\n").unwrap();

    fmq_recipe(&home)
        .arg("inspect")
        .args(LINUX)
        .current_dir(tree.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configure phase failed"));
}

// ============================================================================
// fmq-recipe export / generate
// ============================================================================

#[test]
fn test_export_copies_sources() {
    let tree = source_tree();
    let export = tree.path().join("build/Release/export");

    fmq_recipe(&home(&tree))
        .arg("export")
        .args(LINUX)
        .current_dir(tree.path())
        .assert()
        .success();

    assert!(export.join("CMakeLists.txt").is_file());
    assert!(export.join("src/helpers/Utils.cpp").is_file());
    assert!(!export.join("README.md").exists());
}

#[test]
fn test_generate_is_byte_identical() {
    let tree = source_tree();
    let generators = tree.path().join("build/Release/generators");

    let run = || {
        fmq_recipe(&home(&tree))
            .arg("generate")
            .args(LINUX)
            .current_dir(tree.path())
            .assert()
            .success();
        (
            fs::read(generators.join("fmq_toolchain.cmake")).unwrap(),
            fs::read(generators.join("CMakePresets.json")).unwrap(),
        )
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);

    let toolchain = String::from_utf8(first.0).unwrap();
    assert!(toolchain.contains("set(BUILD_SHARED_LIBS \"ON\" CACHE BOOL"));
    assert!(toolchain.contains("CMAKE_POSITION_INDEPENDENT_CODE \"OFF\""));
}

// ============================================================================
// fmq-recipe create
// ============================================================================

#[cfg(unix)]
fn fake_cmake(tree: &TempDir, build_script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        r#"#!/bin/sh
case "$1" in
  --build)
{build_script}
    ;;
  --install)
    while [ $# -gt 0 ]; do
      if [ "$1" = "--prefix" ]; then prefix="$2"; fi
      shift
    done
    mkdir -p "$prefix/lib" && touch "$prefix/lib/libfinalmq.so"
    ;;
  *)
    echo "-- Configuring done"
    ;;
esac
"#
    );

    let bin = tree.path().join(".tools");
    fs::create_dir_all(&bin).unwrap();
    let cmake = bin.join("cmake");
    fs::write(&cmake, script).unwrap();
    fs::set_permissions(&cmake, fs::Permissions::from_mode(0o755)).unwrap();

    let config_dir = tree.path().join(".fmq-recipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("[build]\ncmake = \"{}\"\n", cmake.display()),
    )
    .unwrap();

    cmake
}

#[cfg(unix)]
#[test]
fn test_create_linux_package() {
    let tree = source_tree();
    fake_cmake(&tree, "    echo '[100%] Built target finalmq'");

    fmq_recipe(&home(&tree))
        .args(["create", "--jobs", "2", "--verify-artifacts"])
        .args(LINUX)
        .current_dir(tree.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Exporting"))
        .stderr(predicate::str::contains("Building"))
        .stderr(predicate::str::contains("Packaging"))
        .stderr(predicate::str::contains("Packaged"))
        .stderr(predicate::str::contains("libs: finalmq"));

    let info = tree.path().join("build/Release/package/package_info.json");
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(info).unwrap()).unwrap();
    assert_eq!(json["libs"], serde_json::json!(["finalmq"]));
    assert_eq!(json["options"]["shared"], true);
    assert_eq!(json["options"]["fPIC"], false);
    assert_eq!(
        json["requires"],
        serde_json::json!(["openssl/1.1.1t", "libuuid/1.0.3"])
    );
}

#[cfg(unix)]
#[test]
fn test_create_reports_build_failure_verbatim() {
    let tree = source_tree();
    fake_cmake(
        &tree,
        "    echo 'src/helpers/Utils.cpp:1:10: error: missing header' >&2\n    exit 2",
    );

    fmq_recipe(&home(&tree))
        .arg("create")
        .args(LINUX)
        .current_dir(tree.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("build phase failed"))
        .stderr(predicate::str::contains(
            "src/helpers/Utils.cpp:1:10: error: missing header\n",
        ));

    assert!(!tree
        .path()
        .join("build/Release/package/package_info.json")
        .exists());
}

#[cfg(unix)]
#[test]
fn test_create_with_missing_cmake_fails_in_build_phase() {
    let tree = source_tree();
    let config_dir = tree.path().join(".fmq-recipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[build]\ncmake = \"/nonexistent/bin/cmake\"\n",
    )
    .unwrap();

    fmq_recipe(&home(&tree))
        .arg("create")
        .args(LINUX)
        .current_dir(tree.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("build phase failed"));
}

// ============================================================================
// fmq-recipe completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tree = source_tree();

    fmq_recipe(&home(&tree))
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fmq-recipe"));
}

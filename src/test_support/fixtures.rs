//! Test fixtures for common test scenarios.

use std::path::Path;

use tempfile::TempDir;

/// Files of a small finalmq-shaped source tree, relative to the root.
pub const SOURCE_FILES: &[(&str, &str)] = &[
    (
        "CMakeLists.txt",
        "cmake_minimum_required(VERSION 3.21)\nproject(finalmq CXX)\n",
    ),
    ("inc/finalmq/helpers/Utils.h", "#pragma once\n"),
    ("src/helpers/Utils.cpp", "#include \"finalmq/helpers/Utils.h\"\n"),
    ("codegenerator/cpp/cpp.js", "// generator\n"),
    ("htdocs/index.html", "<html></html>\n"),
    ("README.md", "# finalmq\n"),
    ("test/test_utils.cpp", "int main() { return 0; }\n"),
];

/// Write [`SOURCE_FILES`] below `root`.
pub fn write_source_tree(root: &Path) {
    for (relative, content) in SOURCE_FILES {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        std::fs::write(&path, content).expect("failed to write fixture file");
    }
}

/// A temporary finalmq-shaped source tree.
///
/// Returns the TempDir handle - dropping it will clean up the directory.
pub fn create_source_tree() -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    write_source_tree(tmp.path());
    tmp
}

//! Filesystem utilities.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Replace `path` with `contents` atomically.
///
/// The data goes to a temporary file in the same directory, which is then
/// renamed over the target. Readers see either the old file or the complete
/// new one. The parent directory must already exist.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Find files matching glob patterns relative to a base directory.
///
/// The base is matched literally, so a root like `finalmq[v1]` works.
/// Patterns that match nothing are not an error; entries that cannot be
/// read are.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let escaped_base = PathBuf::from(Pattern::escape(&base.to_string_lossy()));
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = escaped_base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        let mut matched = 0usize;
        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            let path = entry.with_context(|| format!("failed to match `{}`", pattern))?;
            if path.is_file() {
                results.push(path);
                matched += 1;
            }
        }

        if matched == 0 {
            tracing::debug!("pattern `{}` matched no files", pattern);
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// All regular files below `dir`, sorted.
pub fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a path with forward slashes, as CMake expects.
pub fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

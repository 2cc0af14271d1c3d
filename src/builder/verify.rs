//! Post-install check that declared libraries were actually installed.

use std::path::{Path, PathBuf};

use crate::core::errors::RecipeError;
use crate::core::platform::{OsFamily, PlatformContext};
use crate::util::fs::walk_files;

/// File name prefixes and extensions a library may be installed under.
fn library_patterns(platform: &PlatformContext) -> (&'static [&'static str], &'static [&'static str]) {
    match platform.os_family() {
        OsFamily::Windows => (&["", "lib"][..], &["lib", "dll", "a"][..]),
        OsFamily::Apple => (&["lib"][..], &["a", "dylib"][..]),
        _ => (&["lib"][..], &["a", "so"][..]),
    }
}

fn matches_library(path: &Path, name: &str, platform: &PlatformContext) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let (prefixes, extensions) = library_patterns(platform);

    prefixes.iter().any(|prefix| {
        let Some(rest) = file_name.strip_prefix(prefix) else {
            return false;
        };
        let Some(rest) = rest.strip_prefix(name) else {
            return false;
        };
        // Versioned shared objects: libfinalmq.so.1.0.0
        extensions.iter().any(|ext| {
            rest.strip_prefix('.')
                .and_then(|r| r.strip_prefix(ext))
                .is_some_and(|tail| tail.is_empty() || tail.starts_with('.'))
        }) || (platform.os_family() == OsFamily::Apple
            && rest.starts_with('.')
            && rest.ends_with(".dylib"))
    })
}

/// Find the installed file for each declared library.
///
/// Fails on the first library with no matching file under `package_folder`.
pub fn verify_artifacts(
    package_folder: &Path,
    libs: &[String],
    platform: &PlatformContext,
) -> Result<Vec<PathBuf>, RecipeError> {
    let files = walk_files(package_folder);
    let mut found = Vec::with_capacity(libs.len());

    for lib in libs {
        match files.iter().find(|f| matches_library(f, lib, platform)) {
            Some(path) => {
                tracing::debug!("Found `{}` at {}", lib, path.display());
                found.push(path.clone());
            }
            None => {
                return Err(RecipeError::MissingArtifact {
                    name: lib.clone(),
                    folder: package_folder.to_path_buf(),
                })
            }
        }
    }

    Ok(found)
}

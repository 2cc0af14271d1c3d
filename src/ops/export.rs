//! Implementation of `fmq-recipe export`.
//!
//! Copies the recipe's exported sources into the export folder, keeping
//! their paths relative to the source root. File contents are never read.

use std::path::{Path, PathBuf};

use crate::core::errors::RecipeError;
use crate::core::recipe::Recipe;
use crate::util::fs::{glob_files, relative_path};

/// Copy every file matched by `exports_sources` into `export_folder`.
///
/// Returns the copied files, relative to the source root, sorted.
pub fn export_sources(
    recipe: &Recipe,
    source_root: &Path,
    export_folder: &Path,
) -> Result<Vec<PathBuf>, RecipeError> {
    let files = glob_files(source_root, &recipe.exports_sources).map_err(|e| {
        RecipeError::Export {
            path: source_root.to_path_buf(),
            source: std::io::Error::other(format!("{:#}", e)),
        }
    })?;

    let mut copied = Vec::with_capacity(files.len());
    for file in files {
        // Never re-export a previous export
        if file.starts_with(export_folder) {
            continue;
        }

        let relative = relative_path(source_root, &file);
        let dest = export_folder.join(&relative);

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| RecipeError::Export {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::copy(&file, &dest).map_err(|source| RecipeError::Export {
            path: file.clone(),
            source,
        })?;

        tracing::trace!("Exported {}", relative.display());
        copied.push(relative);
    }

    tracing::debug!(
        "Exported {} files to {}",
        copied.len(),
        export_folder.display()
    );
    Ok(copied)
}

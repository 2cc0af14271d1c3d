//! Global context: working directory, home directory and config locations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::ConfigError;
use crate::util::config::{load_config, Config};

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "FMQ_RECIPE_HOME";

/// Name of the per-project and per-user directory.
const DIR_NAME: &str = ".fmq-recipe";

/// Global context containing paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for user-wide data (~/.fmq-recipe/)
    home: PathBuf,
}

impl GlobalContext {
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => directories::BaseDirs::new()
                .map(|b| b.home_dir().join(DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(DIR_NAME)),
        };

        GlobalContext { cwd, home }
    }

    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Project configuration file for a source root.
    pub fn project_config_path(source_root: &Path) -> PathBuf {
        source_root.join(DIR_NAME).join("config.toml")
    }

    /// Global config merged with the project config of `source_root`.
    pub fn load_config(&self, source_root: &Path) -> Result<Config, ConfigError> {
        load_config(&self.config_path(), &Self::project_config_path(source_root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"))
            .with_home(PathBuf::from("/home/dev/.fmq-recipe"));

        assert_eq!(
            ctx.config_path(),
            PathBuf::from("/home/dev/.fmq-recipe/config.toml")
        );
        assert_eq!(
            GlobalContext::project_config_path(Path::new("/work/finalmq")),
            PathBuf::from("/work/finalmq/.fmq-recipe/config.toml")
        );
        assert_eq!(ctx.resolve_path(Path::new("src")), PathBuf::from("/work/src"));
        assert_eq!(ctx.resolve_path(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[test]
    fn test_load_config_project_wins() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(project.join(".fmq-recipe")).unwrap();

        std::fs::write(home.join("config.toml"), "[build]\njobs = 4\ngenerator = \"Ninja\"\n")
            .unwrap();
        std::fs::write(
            project.join(".fmq-recipe").join("config.toml"),
            "[build]\njobs = 12\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(project.clone()).with_home(home);
        let config = ctx.load_config(&project).unwrap();
        assert_eq!(config.build.jobs, Some(12));
        assert_eq!(config.build.generator.as_deref(), Some("Ninja"));
    }
}

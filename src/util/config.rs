//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.fmq-recipe/config.toml` - user-wide defaults
//! - Project: `.fmq-recipe/config.toml` - per source tree overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! build_type = "Debug"
//!
//! [options]
//! shared = false
//!
//! [build]
//! generator = "Ninja"
//! jobs = 8
//!
//! [package]
//! verify_artifacts = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;
use crate::core::options::OptionDefaults;
use crate::core::platform::SettingsSpec;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default settings (`-s` on the command line wins)
    pub settings: SettingsSpec,

    /// Option overrides layered over the recipe defaults
    pub options: OptionDefaults,

    pub build: BuildConfig,

    pub package: PackageConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// CMake generator, instead of the one picked for the platform
    pub generator: Option<String>,

    /// Parallel jobs handed to the build tool (None = tool default)
    pub jobs: Option<usize>,

    /// Path to the cmake executable (None = search PATH)
    pub cmake: Option<PathBuf>,
}

/// Package-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Install destination, relative to the source root
    pub folder: Option<PathBuf>,

    /// Check that every declared library was installed
    pub verify_artifacts: bool,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A file that cannot be read or parsed is an error, never an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            message,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| invalid(e.to_string().trim_end().to_string()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.settings = other.settings.or(&self.settings);
        self.options.merge(&other.options);

        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.cmake.is_some() {
            self.build.cmake = other.build.cmake;
        }

        if other.package.folder.is_some() {
            self.package.folder = other.package.folder;
        }
        if other.package.verify_artifacts {
            self.package.verify_artifacts = true;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.fmq-recipe/config.toml)
/// 2. Global config (~/.fmq-recipe/config.toml)
/// 3. Defaults
///
/// Missing files are skipped. Broken ones fail the whole load.
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    for path in [global_path, project_path] {
        if path.exists() {
            config.merge(Config::load(path)?);
        }
    }

    Ok(config)
}

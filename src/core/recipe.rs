//! The recipe descriptor: package identity, options, requirements, exported
//! sources and the libraries the package declares for consumers.
//!
//! A recipe is plain data. It is either the built-in finalmq recipe or read
//! from a `Recipe.toml` at the source root:
//!
//! ```toml
//! [package]
//! name = "finalmq"
//! version = "1.0.0"
//! license = "MIT"
//!
//! [options.shared]
//! values = [true, false]
//! default = true
//!
//! [options.fPIC]
//! values = [true, false]
//! default = false
//! unsupported_on = ["windows"]
//!
//! [[requires]]
//! ref = "libuuid/1.0.3"
//! when = { os_family = "linux" }
//!
//! [package_info]
//! libs = ["finalmq"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::errors::ConfigError;
use crate::core::options::{
    resolve_options, ActiveOptionSet, OptionDecl, OptionDefaults, OptionSchema,
};
use crate::core::platform::{OsFamily, PlatformContext};
use crate::core::requirement::{
    resolve_requirements, Condition, Reference, RequirementDecl, RequirementSet,
};

/// File name of an on-disk recipe.
pub const RECIPE_FILE: &str = "Recipe.toml";

/// Package identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
}

/// What the package exposes to consumers once installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfoDecl {
    /// Library names to link against, without prefix or extension.
    #[serde(default)]
    pub libs: Vec<String>,
}

/// A complete recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub package: RecipeInfo,

    #[serde(default)]
    pub options: OptionSchema,

    #[serde(default)]
    pub requires: Vec<RequirementDecl>,

    /// Glob patterns, relative to the source root, copied into the export.
    #[serde(default)]
    pub exports_sources: Vec<String>,

    #[serde(default)]
    pub package_info: PackageInfoDecl,
}

impl Recipe {
    /// The built-in finalmq recipe.
    pub fn finalmq() -> Self {
        Recipe {
            package: RecipeInfo {
                name: "finalmq".to_string(),
                version: "1.0.0".to_string(),
                license: Some("MIT".to_string()),
                url: Some("https://github.com/bexoft/finalmq".to_string()),
                description: Some(
                    "Cross-platform message queue and remote entity framework".to_string(),
                ),
                topics: vec![
                    "messaging".to_string(),
                    "rpc".to_string(),
                    "protobuf".to_string(),
                    "json".to_string(),
                ],
            },
            options: OptionSchema::new()
                .with("shared", OptionDecl::toggle(true))
                .with(
                    "fPIC",
                    OptionDecl::toggle(false).unsupported_on(OsFamily::Windows),
                ),
            requires: vec![
                RequirementDecl::always(Reference::new("openssl", "1.1.1t")),
                RequirementDecl::always(Reference::new("libuuid", "1.0.3")),
                RequirementDecl::when(
                    Reference::new("libuuid", "1.0.3"),
                    Condition::OsFamily(OsFamily::Linux),
                ),
            ],
            exports_sources: [
                "CMakeLists.txt",
                "codegenerator/**/*",
                "examples/**/*",
                "htdocs/**/*",
                "inc/**/*",
                "services/**/*",
                "src/**/*",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            package_info: PackageInfoDecl {
                libs: vec!["finalmq".to_string()],
            },
        }
    }

    /// Load a recipe from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to load recipe: {}", path.display()))
    }

    /// Parse and validate recipe content.
    pub fn parse(content: &str) -> Result<Self> {
        let recipe: Recipe = toml::from_str(content).context("failed to parse recipe TOML")?;
        recipe.validate()?;
        Ok(recipe)
    }

    /// Use `Recipe.toml` from `source_root` if present, the built-in recipe otherwise.
    pub fn discover(source_root: &Path) -> Result<(Self, Option<PathBuf>)> {
        let path = source_root.join(RECIPE_FILE);
        if path.is_file() {
            tracing::debug!("Using recipe {}", path.display());
            Ok((Self::load(&path)?, Some(path)))
        } else {
            tracing::debug!("No {} found, using built-in finalmq recipe", RECIPE_FILE);
            Ok((Self::finalmq(), None))
        }
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package.name.trim().is_empty() {
            return Err(ConfigError::InvalidRecipe("package name is empty".into()));
        }

        self.version()?;

        if let Some(ref url) = self.package.url {
            Url::parse(url).map_err(|e| {
                ConfigError::InvalidRecipe(format!("invalid url `{}`: {}", url, e))
            })?;
        }

        for (name, decl) in self.options.iter() {
            if decl.values.is_empty() {
                return Err(ConfigError::InvalidRecipe(format!(
                    "option `{}` has an empty domain",
                    name
                )));
            }
            if let Some(ref default) = decl.default {
                decl.coerce(name, default)?;
            }
        }

        if self.package_info.libs.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::InvalidRecipe(
                "package_info.libs contains an empty name".into(),
            ));
        }

        Ok(())
    }

    pub fn version(&self) -> Result<Version, ConfigError> {
        self.package.version.parse().map_err(|e| {
            ConfigError::InvalidRecipe(format!(
                "invalid version `{}`: {}",
                self.package.version, e
            ))
        })
    }

    /// `name/version` of the package this recipe produces.
    pub fn reference(&self) -> Reference {
        Reference::new(&self.package.name, &self.package.version)
    }

    /// Defaults declared by the recipe itself.
    pub fn default_options(&self) -> OptionDefaults {
        self.options.declared_defaults()
    }

    pub fn resolve_options(
        &self,
        defaults: &OptionDefaults,
        platform: &PlatformContext,
    ) -> Result<ActiveOptionSet, ConfigError> {
        resolve_options(&self.options, defaults, platform)
    }

    pub fn resolve_requirements(&self, platform: &PlatformContext) -> RequirementSet {
        resolve_requirements(&self.requires, platform)
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Self::finalmq()
    }
}

//! Recipe evaluation: everything that can be decided before touching disk.
//!
//! Settings come from the command line, then config, then the host. Option
//! values come from the command line, then config, then the recipe. The
//! result is a snapshot every later phase reads from.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::builder::generator::CMakeGenerator;
use crate::core::errors::RecipeError;
use crate::core::layout::Layout;
use crate::core::metadata::{PackageId, PackageMetadata};
use crate::core::options::ActiveOptionSet;
use crate::core::platform::{PlatformContext, SettingsSpec};
use crate::core::recipe::Recipe;
use crate::core::requirement::RequirementSet;
use crate::util::config::Config;
use crate::util::context::GlobalContext;

/// Inputs shared by every command that evaluates the recipe.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Source root (None = current directory)
    pub source: Option<PathBuf>,

    /// Explicit recipe file (None = `Recipe.toml` in the source root, else built-in)
    pub recipe: Option<PathBuf>,

    /// `key=value` settings
    pub settings: Vec<String>,

    /// `name=value` option overrides
    pub options: Vec<String>,
}

/// A fully evaluated recipe for one platform.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub recipe: Recipe,
    pub recipe_path: Option<PathBuf>,
    pub platform: PlatformContext,
    pub options: ActiveOptionSet,
    pub requirements: RequirementSet,
    pub generator: CMakeGenerator,
    pub layout: Layout,
    pub package_id: PackageId,
    #[serde(skip)]
    pub config: Config,
}

impl Evaluation {
    /// Metadata the package will publish once installed.
    pub fn declared_metadata(&self) -> PackageMetadata {
        PackageMetadata {
            reference: self.recipe.reference(),
            package_id: self.package_id.clone(),
            settings: self.platform,
            options: self.options.clone(),
            requires: self.requirements.clone(),
            libs: self.recipe.package_info.libs.clone(),
            package_folder: self.layout.package_folder.clone(),
        }
    }
}

/// Evaluate the recipe. No side effects.
pub fn evaluate(ctx: &GlobalContext, opts: &EvalOptions) -> Result<Evaluation> {
    let source_root = match opts.source {
        Some(ref dir) => ctx.resolve_path(dir),
        None => ctx.cwd().to_path_buf(),
    };
    let config = ctx.load_config(&source_root).map_err(RecipeError::from)?;

    let (recipe, recipe_path) = match opts.recipe {
        Some(ref path) => {
            let path = ctx.resolve_path(path);
            (Recipe::load(&path)?, Some(path))
        }
        None => Recipe::discover(&source_root)?,
    };

    let mut settings = SettingsSpec::default();
    for assignment in &opts.settings {
        settings.assign(assignment).map_err(RecipeError::from)?;
    }
    let platform = settings
        .or(&config.settings)
        .resolve()
        .map_err(RecipeError::from)?;
    tracing::debug!("Platform: {}", platform);

    let mut defaults = recipe.default_options();
    defaults.merge(&config.options);
    for assignment in &opts.options {
        defaults.assign(assignment).map_err(RecipeError::from)?;
    }
    let options = recipe
        .resolve_options(&defaults, &platform)
        .map_err(RecipeError::from)?;
    let requirements = recipe.resolve_requirements(&platform);

    let generator = match config.build.generator {
        Some(ref name) => CMakeGenerator::named(name.as_str(), &platform),
        None => CMakeGenerator::for_platform(&platform),
    };
    let layout = Layout::bind(
        &source_root,
        &platform,
        generator.is_multi_config(),
        config.package.folder.as_deref(),
    );
    let package_id = PackageId::compute(&platform, &options, &requirements);

    Ok(Evaluation {
        recipe,
        recipe_path,
        platform,
        options,
        requirements,
        generator,
        layout,
        package_id,
        config,
    })
}

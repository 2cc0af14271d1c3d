//! Implementation of `fmq-recipe generate` and `fmq-recipe create`.
//!
//! `create` runs the phases strictly in order: export, generate, build,
//! package. The first failure stops everything after it.

use std::path::PathBuf;

use crate::builder::backend::{BuildInvocation, BuildSystem};
use crate::builder::generator::ToolchainDescriptor;
use crate::builder::lifecycle::Lifecycle;
use crate::core::errors::RecipeError;
use crate::core::layout::Layout;
use crate::core::metadata::PackageMetadata;
use crate::ops::evaluate::Evaluation;
use crate::ops::export::export_sources;

/// Step `create` is about to run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStep {
    Exporting,
    Generating,
    Building,
    Packaging,
}

/// Options for the create command.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Number of parallel jobs
    pub jobs: Option<usize>,

    /// Check installed libraries before publishing metadata
    pub verify_artifacts: bool,

    /// Verbose build tool output
    pub verbose: bool,
}

impl CreateOptions {
    /// Fill unset values from config.
    pub fn with_config(mut self, eval: &Evaluation) -> Self {
        if self.jobs.is_none() {
            self.jobs = eval.config.build.jobs;
        }
        self.verify_artifacts |= eval.config.package.verify_artifacts;
        self
    }
}

/// Create the folders generation writes into.
pub fn prepare_layout(layout: &Layout) -> Result<(), RecipeError> {
    for folder in layout.folders() {
        std::fs::create_dir_all(folder).map_err(|source| RecipeError::Generation {
            path: folder.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Derive the toolchain for an evaluation and write it.
pub fn generate(eval: &Evaluation) -> Result<(ToolchainDescriptor, Vec<PathBuf>), RecipeError> {
    let descriptor = ToolchainDescriptor::generate(
        &eval.options,
        &eval.platform,
        &eval.layout,
        eval.generator.clone(),
    );
    prepare_layout(&eval.layout)?;
    let written = descriptor.write()?;
    Ok((descriptor, written))
}

/// Build and package a generated toolchain.
///
/// `progress` is told before each lifecycle transition starts.
pub fn build_and_package(
    eval: &Evaluation,
    descriptor: &ToolchainDescriptor,
    system: &dyn BuildSystem,
    opts: &CreateOptions,
    mut progress: impl FnMut(CreateStep),
) -> Result<PackageMetadata, RecipeError> {
    let invocation = BuildInvocation::from_descriptor(descriptor)
        .with_jobs(opts.jobs)
        .with_verbose(opts.verbose);

    let mut lifecycle = Lifecycle::new(system, invocation, eval.declared_metadata())
        .verify_artifacts(opts.verify_artifacts);

    progress(CreateStep::Building);
    lifecycle.build()?;
    progress(CreateStep::Packaging);
    lifecycle.package().cloned()
}

/// Run every phase for an evaluation: export, generate, build, package.
pub fn create(
    eval: &Evaluation,
    system: &dyn BuildSystem,
    opts: &CreateOptions,
    mut progress: impl FnMut(CreateStep),
) -> Result<PackageMetadata, RecipeError> {
    progress(CreateStep::Exporting);
    let exported = export_sources(
        &eval.recipe,
        &eval.layout.source_folder,
        &eval.layout.export_folder,
    )?;
    tracing::debug!("Exported {} source files", exported.len());

    progress(CreateStep::Generating);
    let (descriptor, _) = generate(eval)?;
    build_and_package(eval, &descriptor, system, opts, progress)
}

//! fmq-recipe - build and package recipe for the finalmq library
//!
//! This crate evaluates the finalmq recipe for a target platform (options,
//! requirements, folder layout), generates the CMake toolchain, and drives
//! the configure, build and install lifecycle that produces the package.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a scripted build system and source tree fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    ActiveOptionSet, ConfigError, Layout, PackageId, PackageMetadata, Phase, PlatformContext,
    Recipe, RecipeError, RequirementSet,
};

pub use util::context::GlobalContext;

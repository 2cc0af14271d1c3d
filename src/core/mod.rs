//! Core recipe model: platform, options, requirements, layout, metadata.

pub mod errors;
pub mod layout;
pub mod metadata;
pub mod options;
pub mod platform;
pub mod recipe;
pub mod requirement;

pub use errors::{ConfigError, Phase, ProcessFailure, RecipeError};
pub use layout::Layout;
pub use metadata::{PackageId, PackageMetadata};
pub use options::{ActiveOptionSet, OptionDecl, OptionDefaults, OptionSchema, OptionValue};
pub use platform::{Arch, BuildType, Compiler, Os, OsFamily, PlatformContext, SettingsSpec};
pub use recipe::Recipe;
pub use requirement::{Condition, Reference, RequirementDecl, RequirementSet};

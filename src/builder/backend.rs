//! BuildSystem trait and the invocation handed to it.
//!
//! The lifecycle only knows this interface. The production implementation
//! drives `cmake`; tests substitute a scripted fake.

use std::path::PathBuf;

use crate::builder::generator::{CMakeGenerator, ToolchainDescriptor};
use crate::core::errors::ProcessFailure;
use crate::core::platform::BuildType;

/// Everything the external build system needs for one build and install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    pub source_folder: PathBuf,
    pub build_folder: PathBuf,
    pub package_folder: PathBuf,
    pub toolchain_file: PathBuf,
    pub generator: CMakeGenerator,
    pub build_type: BuildType,

    /// Parallel jobs (None = tool default)
    pub jobs: Option<usize>,

    /// Ask the tool for verbose output
    pub verbose: bool,
}

impl BuildInvocation {
    pub fn from_descriptor(descriptor: &ToolchainDescriptor) -> Self {
        BuildInvocation {
            source_folder: descriptor.source_folder.clone(),
            build_folder: descriptor.build_folder.clone(),
            package_folder: descriptor.install_prefix.clone(),
            toolchain_file: descriptor.toolchain_path(),
            generator: descriptor.generator.clone(),
            build_type: descriptor.build_type,
            jobs: None,
            verbose: false,
        }
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_multi_config(&self) -> bool {
        self.generator.is_multi_config()
    }
}

/// An external build system.
///
/// Both operations run the tool to completion. A failure carries the tool's
/// output untouched; the caller decides which phase it belongs to.
pub trait BuildSystem {
    /// Short name for messages (e.g. "cmake").
    fn name(&self) -> &str;

    /// Configure and compile.
    fn build(&self, invocation: &BuildInvocation) -> Result<(), ProcessFailure>;

    /// Install the built artifacts into the package folder.
    fn install(&self, invocation: &BuildInvocation) -> Result<(), ProcessFailure>;
}

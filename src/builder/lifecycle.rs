//! Lifecycle driver: `Configured -> Built -> Packaged`.
//!
//! Each transition runs the external build system once. A failed transition
//! leaves the state where it was and nothing is retried. Package metadata
//! only exists once the terminal state is reached.

use std::fmt;
use std::path::Path;

use crate::builder::backend::{BuildInvocation, BuildSystem};
use crate::builder::verify::verify_artifacts;
use crate::core::errors::RecipeError;
use crate::core::metadata::{PackageMetadata, PACKAGE_INFO_FILE};
use crate::util::fs::write_atomic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Configured,
    Built,
    Packaged,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Configured => "configured",
            LifecycleState::Built => "built",
            LifecycleState::Packaged => "packaged",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Lifecycle<'a> {
    system: &'a dyn BuildSystem,
    invocation: BuildInvocation,
    state: LifecycleState,
    /// Declared up front, published after install
    declared: PackageMetadata,
    metadata: Option<PackageMetadata>,
    verify: bool,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        system: &'a dyn BuildSystem,
        invocation: BuildInvocation,
        declared: PackageMetadata,
    ) -> Self {
        Lifecycle {
            system,
            invocation,
            state: LifecycleState::Configured,
            declared,
            metadata: None,
            verify: false,
        }
    }

    /// Check installed libraries before publishing metadata.
    pub fn verify_artifacts(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn invocation(&self) -> &BuildInvocation {
        &self.invocation
    }

    /// Metadata, available once packaged.
    pub fn metadata(&self) -> Option<&PackageMetadata> {
        self.metadata.as_ref()
    }

    /// `Configured -> Built`.
    pub fn build(&mut self) -> Result<(), RecipeError> {
        if self.state != LifecycleState::Configured {
            return Err(self.out_of_order("build"));
        }

        tracing::debug!("Building with {}", self.system.name());
        self.system
            .build(&self.invocation)
            .map_err(RecipeError::Build)?;

        self.state = LifecycleState::Built;
        Ok(())
    }

    /// `Built -> Packaged`.
    pub fn package(&mut self) -> Result<&PackageMetadata, RecipeError> {
        if self.state != LifecycleState::Built {
            return Err(self.out_of_order("package"));
        }

        self.system
            .install(&self.invocation)
            .map_err(RecipeError::Package)?;

        if self.verify {
            verify_artifacts(
                &self.invocation.package_folder,
                self.declared.libs(),
                &self.declared.settings,
            )?;
        }

        let metadata = self.declared.clone();
        write_package_info(&metadata, &self.invocation.package_folder)?;

        self.state = LifecycleState::Packaged;
        Ok(self.metadata.insert(metadata))
    }

    /// Run both transitions in order.
    pub fn run(&mut self) -> Result<&PackageMetadata, RecipeError> {
        self.build()?;
        self.package()
    }

    fn out_of_order(&self, action: &'static str) -> RecipeError {
        RecipeError::OutOfOrder {
            action,
            state: self.state.as_str(),
        }
    }
}

fn write_package_info(metadata: &PackageMetadata, package_folder: &Path) -> Result<(), RecipeError> {
    let path = package_folder.join(PACKAGE_INFO_FILE);
    let to_error = |source: std::io::Error| RecipeError::Metadata {
        path: path.clone(),
        source,
    };

    let json = metadata.to_json().map_err(|e| to_error(std::io::Error::other(e)))?;
    std::fs::create_dir_all(package_folder).map_err(to_error)?;
    write_atomic(&path, json.as_bytes()).map_err(to_error)?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

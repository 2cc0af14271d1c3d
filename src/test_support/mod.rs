//! Test utilities and mocks for unit tests.
//!
//! The main piece is [`MockBuildSystem`], a scripted stand-in for CMake that
//! records every call and fails where it is told to.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{MockBuildSystem, MockStep};
//!
//! let system = MockBuildSystem::new().fail_on(MockStep::Build, 2, "error: boom\n");
//! let mut lifecycle = Lifecycle::new(&system, invocation, metadata);
//! assert!(lifecycle.run().is_err());
//! assert_eq!(system.calls(), vec![MockStep::Build]);
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::builder::backend::{BuildInvocation, BuildSystem};
use crate::core::errors::ProcessFailure;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Operations a build system is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockStep {
    Build,
    Install,
}

/// Mock process output for a scripted step.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn into_result(self, step: MockStep) -> Result<(), ProcessFailure> {
        if self.status == 0 {
            Ok(())
        } else {
            Err(ProcessFailure {
                command: format!("mock {:?}", step).to_lowercase(),
                status: Some(self.status),
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Scripted build system.
///
/// Every step succeeds unless scripted otherwise. A successful install
/// creates the configured files under the package folder.
#[derive(Debug, Default)]
pub struct MockBuildSystem {
    outputs: HashMap<MockStep, MockProcessOutput>,
    installed: Vec<PathBuf>,
    calls: RefCell<Vec<MockStep>>,
    invocations: RefCell<Vec<BuildInvocation>>,
}

impl MockBuildSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a step fail with the given status and stderr.
    pub fn fail_on(mut self, step: MockStep, status: i32, stderr: &str) -> Self {
        self.outputs
            .insert(step, MockProcessOutput::failure(status, stderr));
        self
    }

    /// File to create, relative to the package folder, on install.
    pub fn installs(mut self, relative: impl Into<PathBuf>) -> Self {
        self.installed.push(relative.into());
        self
    }

    /// Steps run so far, in order.
    pub fn calls(&self) -> Vec<MockStep> {
        self.calls.borrow().clone()
    }

    /// Invocations received so far, in order.
    pub fn invocations(&self) -> Vec<BuildInvocation> {
        self.invocations.borrow().clone()
    }

    fn record(&self, step: MockStep, invocation: &BuildInvocation) -> Result<(), ProcessFailure> {
        self.calls.borrow_mut().push(step);
        self.invocations.borrow_mut().push(invocation.clone());
        self.outputs
            .get(&step)
            .cloned()
            .unwrap_or_default()
            .into_result(step)
    }
}

impl BuildSystem for MockBuildSystem {
    fn name(&self) -> &str {
        "mock"
    }

    fn build(&self, invocation: &BuildInvocation) -> Result<(), ProcessFailure> {
        self.record(MockStep::Build, invocation)
    }

    fn install(&self, invocation: &BuildInvocation) -> Result<(), ProcessFailure> {
        self.record(MockStep::Install, invocation)?;

        for relative in &self.installed {
            let path = invocation.package_folder.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("failed to create install dir");
            }
            std::fs::write(&path, b"").expect("failed to write installed file");
        }
        Ok(())
    }
}

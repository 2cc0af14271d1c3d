//! External build driving.
//!
//! This module turns a resolved configuration into toolchain files and runs
//! the external build system through the configure, build and install
//! lifecycle.

pub mod backend;
pub mod cmake;
pub mod generator;
pub mod lifecycle;
pub mod verify;

pub use backend::{BuildInvocation, BuildSystem};
pub use cmake::CMakeBuildSystem;
pub use generator::{CMakeGenerator, ToolchainDescriptor, PRESETS_FILE, TOOLCHAIN_FILE};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use verify::verify_artifacts;

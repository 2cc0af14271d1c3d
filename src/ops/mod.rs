//! High-level operations.
//!
//! This module contains the implementation of fmq-recipe commands.

pub mod create;
pub mod evaluate;
pub mod export;
pub mod inspect;

pub use create::{build_and_package, create, generate, prepare_layout, CreateOptions, CreateStep};
pub use evaluate::{evaluate, EvalOptions, Evaluation};
pub use export::export_sources;
pub use inspect::{format_human, inspect, InspectReport, ReportFormat};

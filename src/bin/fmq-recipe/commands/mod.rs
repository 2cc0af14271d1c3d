//! Command implementations

pub mod completions;
pub mod create;
pub mod export;
pub mod generate;
pub mod inspect;

//! Error taxonomy for recipe evaluation and the build lifecycle.
//!
//! Every failure carries the phase it came from so the front end can report
//! "which phase failed" next to the external tool's output, unmodified.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Phase of recipe evaluation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Configure,
    Export,
    Generate,
    Build,
    Package,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Configure => "configure",
            Phase::Export => "export",
            Phase::Generate => "generate",
            Phase::Build => "build",
            Phase::Package => "package",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration problems. Always raised before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown setting `{0}`")]
    #[diagnostic(
        code(fmq_recipe::configure::unknown_setting),
        help("valid settings: os, arch, compiler, build_type")
    )]
    UnknownSetting(String),

    #[error("unrecognized value `{value}` for setting `{setting}`")]
    #[diagnostic(
        code(fmq_recipe::configure::unknown_setting_value),
        help("valid values: {expected}")
    )]
    UnknownSettingValue {
        setting: String,
        value: String,
        expected: String,
    },

    #[error("unknown option `{0}`")]
    #[diagnostic(
        code(fmq_recipe::configure::unknown_option),
        help("run `fmq-recipe inspect` to list the recipe's options")
    )]
    UnknownOption(String),

    #[error("invalid value `{value}` for option `{option}`")]
    #[diagnostic(
        code(fmq_recipe::configure::option_domain),
        help("possible values: {expected}")
    )]
    OptionDomain {
        option: String,
        value: String,
        expected: String,
    },

    #[error("option `{0}` has no selected value")]
    #[diagnostic(code(fmq_recipe::configure::missing_option_value))]
    MissingOptionValue(String),

    #[error("malformed assignment `{0}`, expected `name=value`")]
    #[diagnostic(code(fmq_recipe::configure::malformed_assignment))]
    MalformedAssignment(String),

    #[error("invalid package reference `{0}`, expected `name/version`")]
    #[diagnostic(code(fmq_recipe::configure::invalid_reference))]
    InvalidReference(String),

    #[error("invalid recipe: {0}")]
    #[diagnostic(code(fmq_recipe::configure::invalid_recipe))]
    InvalidRecipe(String),

    #[error("invalid config file `{}`: {message}", path.display())]
    #[diagnostic(
        code(fmq_recipe::configure::invalid_config),
        help("fix or remove the file; valid sections are [settings], [options], [build] and [package]")
    )]
    InvalidConfig { path: PathBuf, message: String },

    #[error("cannot detect the host `{setting}`")]
    #[diagnostic(
        code(fmq_recipe::configure::undetected_host),
        help("set it explicitly with `-s {setting}=<value>` or in the [settings] config section")
    )]
    UndetectedHost { setting: &'static str },
}

/// A failed invocation of an external tool.
///
/// `stdout` and `stderr` hold the tool's output as written. Bytes that are
/// not valid UTF-8 are replaced with U+FFFD when captured; nothing else is
/// changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub command: String,
    /// Exit code, `None` if the process was killed or never started.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessFailure {
    /// The tool could not be started at all.
    pub fn spawn(command: impl Into<String>, err: impl fmt::Display) -> Self {
        ProcessFailure {
            command: command.into(),
            status: None,
            stdout: String::new(),
            stderr: err.to_string(),
        }
    }

    /// Stdout followed by stderr, concatenated as-is.
    pub fn diagnostic_output(&self) -> String {
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len());
        out.push_str(&self.stdout);
        out.push_str(&self.stderr);
        out
    }
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "`{}` exited with status {}", self.command, code),
            None => write!(f, "`{}` did not run to completion", self.command),
        }
    }
}

/// Any failure surfaced by recipe evaluation.
#[derive(Debug, Error, Diagnostic)]
pub enum RecipeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to export `{}`", path.display())]
    #[diagnostic(code(fmq_recipe::export::copy_failed))]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write toolchain file `{}`", path.display())]
    #[diagnostic(
        code(fmq_recipe::generate::write_failed),
        help("check that the generators folder exists and is writable")
    )]
    Generation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("build failed: {0}")]
    #[diagnostic(code(fmq_recipe::build::failed))]
    Build(ProcessFailure),

    #[error("package failed: {0}")]
    #[diagnostic(code(fmq_recipe::package::failed))]
    Package(ProcessFailure),

    #[error("failed to write package metadata `{}`", path.display())]
    #[diagnostic(code(fmq_recipe::package::metadata_write_failed))]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("declared library `{name}` was not found under `{}`", folder.display())]
    #[diagnostic(
        code(fmq_recipe::package::missing_artifact),
        help("the package declares libraries the build did not install")
    )]
    MissingArtifact { name: String, folder: PathBuf },

    #[error("cannot {action} while the lifecycle is {state}")]
    #[diagnostic(code(fmq_recipe::lifecycle::out_of_order))]
    OutOfOrder {
        action: &'static str,
        state: &'static str,
    },
}

impl RecipeError {
    /// The phase this error aborted.
    pub fn phase(&self) -> Phase {
        match self {
            RecipeError::Config(_) => Phase::Configure,
            RecipeError::Export { .. } => Phase::Export,
            RecipeError::Generation { .. } => Phase::Generate,
            RecipeError::Build(_) => Phase::Build,
            RecipeError::Package(_)
            | RecipeError::Metadata { .. }
            | RecipeError::MissingArtifact { .. } => Phase::Package,
            RecipeError::OutOfOrder { action, .. } => {
                if *action == "package" {
                    Phase::Package
                } else {
                    Phase::Build
                }
            }
        }
    }

    /// Output captured from the external tool, if this error carries any.
    pub fn tool_output(&self) -> Option<String> {
        match self {
            RecipeError::Build(failure) | RecipeError::Package(failure) => {
                Some(failure.diagnostic_output())
            }
            _ => None,
        }
    }
}

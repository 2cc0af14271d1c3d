//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use finalmq_recipe::ops::EvalOptions;
use finalmq_recipe::util::shell::ColorChoice;

/// fmq-recipe - build and package the finalmq library
#[derive(Parser)]
#[command(name = "fmq-recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved settings, options, requirements and layout
    Inspect(InspectArgs),

    /// Copy the recipe's exported sources into the export folder
    Export(ExportArgs),

    /// Write the CMake toolchain and presets
    Generate(GenerateArgs),

    /// Export, generate, build and package
    Create(CreateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments shared by every command that evaluates the recipe.
#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    /// Setting as key=value (os, arch, compiler, build_type)
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Option override as name=value
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Recipe file (defaults to Recipe.toml in the source root, else built-in)
    #[arg(long, value_name = "PATH")]
    pub recipe: Option<PathBuf>,

    /// Source root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,
}

impl EvalArgs {
    pub fn to_options(&self) -> EvalOptions {
        EvalOptions {
            source: self.source.clone(),
            recipe: self.recipe.clone(),
            settings: self.settings.clone(),
            options: self.options.clone(),
        }
    }
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub eval: EvalArgs,

    /// Output format: human, json
    #[arg(long, default_value = "human", value_parser = ["human", "json"])]
    pub format: String,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub eval: EvalArgs,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub eval: EvalArgs,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub eval: EvalArgs,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Fail if a declared library was not installed
    #[arg(long)]
    pub verify_artifacts: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

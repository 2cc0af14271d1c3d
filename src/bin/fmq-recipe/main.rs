//! fmq-recipe CLI - build and package the finalmq library

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use finalmq_recipe::core::{ConfigError, Phase, RecipeError};
use finalmq_recipe::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("finalmq_recipe=debug")
    } else if cli.quiet {
        EnvFilter::new("finalmq_recipe=error")
    } else {
        EnvFilter::new("finalmq_recipe=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli, &shell) {
        report(&shell, &e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args, shell),
        Commands::Export(args) => commands::export::execute(args, shell),
        Commands::Generate(args) => commands::generate::execute(args, shell),
        Commands::Create(args) => commands::create::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print the failing phase, the error chain, and any tool output verbatim.
fn report(shell: &Shell, err: &anyhow::Error) {
    let recipe_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<RecipeError>());

    let phase = match recipe_error {
        Some(e) => Some(e.phase()),
        None if err.chain().any(|c| c.downcast_ref::<ConfigError>().is_some()) => {
            Some(Phase::Configure)
        }
        None => None,
    };

    match phase {
        Some(phase) => shell.error(format!("{} phase failed: {:#}", phase, err)),
        None => shell.error(format!("{:#}", err)),
    }

    if let Some(output) = recipe_error.and_then(RecipeError::tool_output) {
        shell.raw(&output);
    }

    if let Some(help) = recipe_error.and_then(|e| e.help()) {
        shell.raw(&format!("help: {}", help));
    }
}

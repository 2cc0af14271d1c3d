//! `fmq-recipe generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use finalmq_recipe::ops::{evaluate, generate};
use finalmq_recipe::util::shell::Status;
use finalmq_recipe::util::{GlobalContext, Shell};

pub fn execute(args: GenerateArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let eval = evaluate(&ctx, &args.eval.to_options())?;

    shell.status(
        Status::Generating,
        format!("{} for {}", eval.recipe.reference(), eval.platform),
    );
    let (_, written) = generate(&eval)?;

    for path in &written {
        shell.status(Status::Generated, path.display());
    }
    Ok(())
}

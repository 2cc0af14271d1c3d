//! `fmq-recipe export` command

use anyhow::Result;

use crate::cli::ExportArgs;
use finalmq_recipe::ops::{evaluate, export_sources};
use finalmq_recipe::util::shell::Status;
use finalmq_recipe::util::{GlobalContext, Shell};

pub fn execute(args: ExportArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let eval = evaluate(&ctx, &args.eval.to_options())?;

    shell.status(Status::Exporting, eval.recipe.reference());
    let files = export_sources(
        &eval.recipe,
        &eval.layout.source_folder,
        &eval.layout.export_folder,
    )?;

    shell.status(
        Status::Exported,
        format!(
            "{} files to {}",
            files.len(),
            eval.layout.export_folder.display()
        ),
    );
    Ok(())
}

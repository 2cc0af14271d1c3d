//! `fmq-recipe inspect` command

use anyhow::Result;

use crate::cli::InspectArgs;
use finalmq_recipe::ops::{evaluate, inspect, ReportFormat};
use finalmq_recipe::util::{GlobalContext, Shell};

pub fn execute(args: InspectArgs, _shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let format: ReportFormat = args.format.parse()?;

    let eval = evaluate(&ctx, &args.eval.to_options())?;
    print!("{}", inspect(&eval, format)?);

    Ok(())
}

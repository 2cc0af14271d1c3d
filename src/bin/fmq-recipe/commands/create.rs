//! `fmq-recipe create` command

use anyhow::Result;

use crate::cli::CreateArgs;
use finalmq_recipe::builder::CMakeBuildSystem;
use finalmq_recipe::ops::{create, evaluate, CreateOptions, CreateStep};
use finalmq_recipe::util::shell::{Activity, Status};
use finalmq_recipe::util::{GlobalContext, Shell};

pub fn execute(args: CreateArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let eval = evaluate(&ctx, &args.eval.to_options())?;
    let reference = eval.recipe.reference();

    // CLI > config > tool default
    let opts = CreateOptions {
        jobs: args.jobs,
        verify_artifacts: args.verify_artifacts,
        verbose: shell.is_verbose(),
    }
    .with_config(&eval);

    let system = CMakeBuildSystem::locate(eval.config.build.cmake.as_deref());

    // Build and install each get a spinner; the previous one finishes when
    // the next step starts.
    let mut activity: Option<Activity<'_>> = None;
    let metadata = create(&eval, &system, &opts, |step| match step {
        CreateStep::Exporting => shell.status(Status::Exporting, &reference),
        CreateStep::Generating => shell.status(
            Status::Generating,
            format!("toolchain for {}", eval.platform),
        ),
        CreateStep::Building => activity = Some(shell.phase(Status::Building, &reference)),
        CreateStep::Packaging => {
            if let Some(built) = activity.take() {
                built.finish(Status::Finished);
            }
            activity = Some(shell.phase(Status::Packaging, &reference));
        }
    })?;
    if let Some(packaged) = activity.take() {
        packaged.finish(Status::Finished);
    }

    shell.status(
        Status::Packaged,
        format!(
            "{} ({}) libs: {}",
            metadata.reference,
            metadata.package_id.short(),
            metadata.libs().join(", ")
        ),
    );
    shell.status(Status::Info, metadata.package_folder.display());
    Ok(())
}

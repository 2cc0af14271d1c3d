//! Implementation of `fmq-recipe inspect`.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use serde::Serialize;

use crate::builder::generator::CMakeGenerator;
use crate::core::layout::Layout;
use crate::core::options::ActiveOptionSet;
use crate::core::platform::PlatformContext;
use crate::core::requirement::RequirementSet;
use crate::ops::evaluate::Evaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "human" => Ok(ReportFormat::Human),
            "json" => Ok(ReportFormat::Json),
            other => anyhow::bail!("unknown format `{}`, expected `human` or `json`", other),
        }
    }
}

/// Serializable view of an evaluation.
#[derive(Debug, Serialize)]
pub struct InspectReport<'a> {
    pub reference: String,
    pub package_id: &'a str,
    pub recipe: Option<&'a Path>,
    pub settings: &'a PlatformContext,
    pub options: &'a ActiveOptionSet,
    pub requires: &'a RequirementSet,
    pub generator: &'a CMakeGenerator,
    pub multi_config: bool,
    pub layout: &'a Layout,
    pub libs: &'a [String],
}

impl<'a> InspectReport<'a> {
    pub fn new(eval: &'a Evaluation) -> Self {
        InspectReport {
            reference: eval.recipe.reference().to_string(),
            package_id: eval.package_id.as_str(),
            recipe: eval.recipe_path.as_deref(),
            settings: &eval.platform,
            options: &eval.options,
            requires: &eval.requirements,
            generator: &eval.generator,
            multi_config: eval.generator.is_multi_config(),
            layout: &eval.layout,
            libs: &eval.recipe.package_info.libs,
        }
    }
}

/// Render the report in the requested format.
pub fn inspect(eval: &Evaluation, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Human => Ok(format_human(eval)),
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(&InspectReport::new(eval))?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Format the report for terminal output.
pub fn format_human(eval: &Evaluation) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", eval.recipe.reference());
    if let Some(ref description) = eval.recipe.package.description {
        let _ = writeln!(out, "  {}", description);
    }
    let _ = writeln!(out, "  package id: {}", eval.package_id.short());
    match eval.recipe_path {
        Some(ref path) => {
            let _ = writeln!(out, "  recipe:     {}", path.display());
        }
        None => out.push_str("  recipe:     (built-in)\n"),
    }

    out.push_str("\nsettings:\n");
    for (name, value) in eval.platform.settings() {
        let _ = writeln!(out, "  {:<12}{}", name, value);
    }

    out.push_str("\noptions:\n");
    if eval.options.is_empty() {
        out.push_str("  (none)\n");
    }
    for (name, value) in eval.options.iter() {
        let _ = writeln!(out, "  {:<12}{}", name, value);
    }

    out.push_str("\nrequires:\n");
    if eval.requirements.is_empty() {
        out.push_str("  (none)\n");
    }
    for reference in &eval.requirements {
        let _ = writeln!(out, "  {}", reference);
    }

    out.push_str("\nlayout:\n");
    let _ = writeln!(
        out,
        "  generator   {}{}",
        eval.generator.name,
        if eval.generator.is_multi_config() {
            " (multi-config)"
        } else {
            ""
        }
    );
    let _ = writeln!(out, "  build       {}", eval.layout.build_folder.display());
    let _ = writeln!(out, "  generators  {}", eval.layout.generators_folder.display());
    let _ = writeln!(out, "  package     {}", eval.layout.package_folder.display());

    let _ = writeln!(out, "\nlibs: {}", eval.recipe.package_info.libs.join(", "));
    out
}

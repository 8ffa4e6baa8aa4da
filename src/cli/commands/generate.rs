//! generate command - Instantiate the template for every region

use anyhow::{Context as _, Result};

use super::{load, verbosity, Loaded};
use crate::engine::{instantiate, ArtifactOutcome, Context};
use crate::ui::output::{self, Verbosity};

/// Create or refresh every region's artifacts on disk.
pub fn generate(ctx: &Context) -> Result<()> {
    let loaded = load(ctx)?;
    generate_loaded(&loaded, verbosity(ctx))
}

pub(crate) fn generate_loaded(loaded: &Loaded, verbosity: Verbosity) -> Result<()> {
    for plan in &loaded.plans {
        let report = instantiate(&loaded.template, plan)
            .with_context(|| format!("failed to generate region '{}'", plan.region))?;

        output::print(format!("{} ({})", report.report_name, report.region), verbosity);
        print_outcome(&report.model, loaded, verbosity);
        print_outcome(&report.report, loaded, verbosity);
    }

    output::success(
        format!("Generated {} region(s)", loaded.plans.len()),
        verbosity,
    );
    Ok(())
}

fn print_outcome(outcome: &ArtifactOutcome, loaded: &Loaded, verbosity: Verbosity) {
    output::print(
        format!(
            "  {:<6}  {}  logicalId {} ({})",
            outcome.kind.as_str(),
            output::format_path(&outcome.dir, &loaded.workdir),
            outcome.logical_id,
            outcome.identity.as_str()
        ),
        verbosity,
    );
    output::debug(
        format!("{} file(s) copied into {}", outcome.files_copied, outcome.dir.display()),
        verbosity,
    );
    if let Some(placeholder) = &outcome.unmatched_placeholder {
        output::warn(
            format!(
                "placeholder '{}' not found in {}; region parameter left unchanged",
                placeholder,
                output::format_path(&outcome.dir, &loaded.workdir)
            ),
            verbosity,
        );
    }
}

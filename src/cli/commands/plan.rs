//! plan command - Show the per-region artifact plan

use anyhow::Result;

use super::{load, verbosity};
use crate::engine::{Context, RegionPlan};
use crate::ui::output::{self, Verbosity};

/// Print the plan for every configured region without writing anything.
pub fn plan(ctx: &Context) -> Result<()> {
    let loaded = load(ctx)?;
    let verbosity = verbosity(ctx);

    output::debug(
        format!("template: {}", loaded.template.template_model.display()),
        verbosity,
    );
    for plan in &loaded.plans {
        print_plan(plan, &loaded.workdir, verbosity);
    }
    output::print(
        format!("{} region(s) planned", loaded.plans.len()),
        verbosity,
    );
    Ok(())
}

fn print_plan(plan: &RegionPlan, root: &std::path::Path, verbosity: Verbosity) {
    let state = |exists: bool| if exists { "exists" } else { "new" };
    output::print(format!("{} ({})", plan.report_name, plan.region), verbosity);
    output::print(
        format!(
            "  model:  {} [{}]",
            output::format_path(&plan.model_dir, root),
            state(plan.model_exists)
        ),
        verbosity,
    );
    output::print(
        format!(
            "  report: {} [{}]",
            output::format_path(&plan.report_dir, root),
            state(plan.report_exists)
        ),
        verbosity,
    );
}

//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves configuration relative to the working directory
//! 2. Calls the engine or publisher
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `publish` and `run` talk to the workspace over HTTP. They build a tokio
//! runtime and block on the async publisher; regions are still processed
//! one at a time.

mod completion;
mod generate;
mod plan;
mod publish;
mod run;

pub use completion::completion;
pub use generate::generate;
pub use plan::plan;
pub use publish::publish;
pub use run::run;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::{ConfigResolver, TemplateConfig};
use crate::engine::{plan_regions, Context, RegionPlan};
use crate::ui::output::Verbosity;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Plan => plan::plan(ctx),
        Command::Generate => generate::generate(ctx),
        Command::Publish { settings } => publish::publish(ctx, settings.as_deref()),
        Command::Run { settings } => run::run(ctx, settings.as_deref()),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Configuration and plans shared by every command that touches artifacts.
pub(crate) struct Loaded {
    pub resolver: ConfigResolver,
    pub workdir: PathBuf,
    pub template: TemplateConfig,
    pub plans: Vec<RegionPlan>,
}

pub(crate) fn load(ctx: &Context) -> Result<Loaded> {
    let workdir = ctx
        .workdir()
        .context("failed to determine the working directory")?;
    let mut resolver = ConfigResolver::new(&workdir);

    let template = resolver
        .template_config(&ctx.template_config)
        .context("failed to load template config")?;
    let regions = resolver
        .regions_config(&ctx.regions_config)
        .context("failed to load regions config")?;
    let plans = plan_regions(&template, &regions)?;

    Ok(Loaded {
        resolver,
        workdir,
        template,
        plans,
    })
}

pub(crate) fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

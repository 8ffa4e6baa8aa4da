//! publish command - Push generated artifacts to the workspace
//!
//! Credentials come from the environment. The HTTP client, token provider
//! and publisher are built per invocation; a tokio runtime drives the
//! async publisher to completion.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{load, verbosity, Loaded};
use crate::auth::{load_credentials, ClientCredentialsProvider, PublishCredentials};
use crate::engine::{Context, RegionPlan};
use crate::publish::{PublishReport, Publisher};
use crate::secrets::EnvSource;
use crate::ui::output::{self, Verbosity};
use crate::workspace::FabricWorkspace;

/// Publish every region's artifacts.
pub fn publish(ctx: &Context, settings: Option<&Path>) -> Result<()> {
    let loaded = load(ctx)?;
    publish_loaded(&loaded, settings, verbosity(ctx))
}

pub(crate) fn publish_loaded(
    loaded: &Loaded,
    settings: Option<&Path>,
    verbosity: Verbosity,
) -> Result<()> {
    let settings = loaded
        .resolver
        .publish_settings(settings)
        .context("failed to load publish settings")?;
    let PublishCredentials {
        credentials,
        workspace_id,
    } = load_credentials(&EnvSource::new())?;

    output::debug(
        format!("publishing to workspace {} at {}", workspace_id, settings.api_base),
        verbosity,
    );

    let provider = ClientCredentialsProvider::new(
        credentials,
        &settings.authority,
        &settings.scope,
        settings.request_timeout,
    )?;
    let workspace = FabricWorkspace::new(Arc::new(provider), workspace_id, &settings);
    let publisher = Publisher::new(Arc::new(workspace), settings);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(publish_async(&publisher, &loaded.plans, verbosity))
}

async fn publish_async(
    publisher: &Publisher,
    plans: &[RegionPlan],
    verbosity: Verbosity,
) -> Result<()> {
    for plan in plans {
        let report = publisher
            .publish_plan(plan)
            .await
            .with_context(|| format!("failed to publish region '{}'", plan.region))?;
        print_report(&report, verbosity);
    }

    output::success(format!("Published {} region(s)", plans.len()), verbosity);
    Ok(())
}

fn print_report(report: &PublishReport, verbosity: Verbosity) {
    output::print(format!("{} ({})", report.report_name, report.region), verbosity);
    for outcome in [&report.model, &report.report] {
        output::print(
            format!(
                "  {:<6}  {}  {}",
                outcome.kind.as_str(),
                outcome.id,
                outcome.action
            ),
            verbosity,
        );
    }
}

//! publish
//!
//! Pushing instantiated artifacts to the remote workspace.
//!
//! # Flow
//!
//! For each region plan, sequentially:
//!
//! 1. **Lookup** - list workspace items, keep those whose display name is
//!    the plan's report name, split by type
//! 2. **Model** - update the existing semantic model or create one; wait for
//!    any long-running operation; on creation resolve the new id
//! 3. **Bind** - rewrite the local report definition to reference the model
//!    by id (`byConnection`)
//! 4. **Report** - update or create the report and wait for completion
//!
//! Every error ends the run. Definition submissions are sent once: when a
//! create fails at the network level the lookup is repeated and an item
//! that appeared in the meantime is adopted.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use regionforge::core::config::PublishSettings;
//! use regionforge::publish::Publisher;
//! use regionforge::workspace::mock::MockWorkspace;
//!
//! # async fn demo(plans: Vec<regionforge::engine::RegionPlan>) -> Result<(), regionforge::publish::PublishError> {
//! let publisher = Publisher::new(Arc::new(MockWorkspace::new()), PublishSettings::default());
//! for report in publisher.publish(&plans).await? {
//!     println!("{}: model {}", report.report_name, report.model.id);
//! }
//! # Ok(())
//! # }
//! ```

mod identity;
mod operation;
mod parts;
mod sleeper;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub use identity::{extract_id, find_item, resolve_by_listing, ExistingItems};
pub use operation::{classify, normalize_status, parse_retry_after, wait_for_operation, OperationState};
pub use parts::collect_parts;
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};

use crate::core::config::PublishSettings;
use crate::core::fsutil::FsError;
use crate::core::metadata::{MetadataError, ReportDefinition};
use crate::core::types::{ArtifactKind, ItemType, RegionCode};
use crate::engine::RegionPlan;
use crate::workspace::{DefinitionRequest, SubmitResponse, SubmitTarget, Workspace, WorkspaceError};

/// Errors from publishing.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("operation failed: {url}\n{body}")]
    OperationFailed { url: String, body: String },

    #[error("operation did not finish within {timeout_secs}s: {url}")]
    OperationTimeout { url: String, timeout_secs: u64 },

    #[error("could not resolve {item_type} id for '{display_name}' after {attempts} attempts")]
    IdentityUnresolved {
        display_name: String,
        item_type: ItemType,
        attempts: u32,
    },
}

/// What publishing did to one remote item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    Created,
    Updated,
    /// A create failed in transit but the item turned up on re-lookup
    Adopted,
}

impl PublishAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishAction::Created => "created",
            PublishAction::Updated => "updated",
            PublishAction::Adopted => "adopted",
        }
    }
}

impl std::fmt::Display for PublishAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub kind: ArtifactKind,
    pub id: String,
    pub action: PublishAction,
}

/// Result of publishing one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub region: RegionCode,
    pub report_name: String,
    pub model: ItemOutcome,
    pub report: ItemOutcome,
}

/// Publishes region plans to one workspace.
pub struct Publisher {
    workspace: Arc<dyn Workspace>,
    sleeper: Arc<dyn Sleeper>,
    settings: PublishSettings,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("workspace", &self.workspace.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Publisher {
    pub fn new(workspace: Arc<dyn Workspace>, settings: PublishSettings) -> Self {
        Self {
            workspace,
            sleeper: Arc::new(TokioSleeper),
            settings,
        }
    }

    /// Replace the sleeper used for operation and identity polling.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Publish every plan in order, stopping at the first error.
    pub async fn publish(&self, plans: &[RegionPlan]) -> Result<Vec<PublishReport>, PublishError> {
        let mut reports = Vec::with_capacity(plans.len());
        for plan in plans {
            reports.push(self.publish_plan(plan).await?);
        }
        Ok(reports)
    }

    /// Publish one region's model and report.
    pub async fn publish_plan(&self, plan: &RegionPlan) -> Result<PublishReport, PublishError> {
        tracing::info!(region = %plan.region, report_name = %plan.report_name, "publishing region");
        let existing = self.lookup(&plan.report_name).await?;

        let model = self
            .publish_artifact(plan, ArtifactKind::Model, existing.model)
            .await?;

        bind_report(plan, &model.id)?;
        tracing::debug!(report_name = %plan.report_name, model_id = %model.id, "bound report to semantic model");

        let report = self
            .publish_artifact(plan, ArtifactKind::Report, existing.report)
            .await?;

        Ok(PublishReport {
            region: plan.region.clone(),
            report_name: plan.report_name.clone(),
            model,
            report,
        })
    }

    async fn lookup(&self, display_name: &str) -> Result<ExistingItems, PublishError> {
        let items = self.workspace.list_items().await?;
        let existing = ExistingItems::from_items(&items, display_name);
        tracing::debug!(
            display_name,
            model = ?existing.model,
            report = ?existing.report,
            "looked up existing items"
        );
        Ok(existing)
    }

    async fn publish_artifact(
        &self,
        plan: &RegionPlan,
        kind: ArtifactKind,
        existing: Option<String>,
    ) -> Result<ItemOutcome, PublishError> {
        let item_type = kind.item_type();
        let request = DefinitionRequest::new(&plan.report_name, collect_parts(plan.dir(kind))?);

        if let Some(id) = existing {
            let target = SubmitTarget::Update {
                item_type,
                id: id.clone(),
            };
            let response = self.workspace.submit_definition(&target, &request).await?;
            self.wait_if_async(&response).await?;
            tracing::info!(kind = %kind, id = %id, "updated item definition");
            return Ok(ItemOutcome {
                kind,
                id,
                action: PublishAction::Updated,
            });
        }

        let target = SubmitTarget::Create(item_type);
        let response = match self.workspace.submit_definition(&target, &request).await {
            Ok(response) => response,
            Err(WorkspaceError::Network(message)) => {
                return self.adopt_after_lost_create(plan, kind, message).await;
            }
            Err(e) => return Err(e.into()),
        };
        self.wait_if_async(&response).await?;

        let id = match extract_id(&response) {
            Some(id) => id,
            None => {
                resolve_by_listing(
                    self.workspace.as_ref(),
                    self.sleeper.as_ref(),
                    &plan.report_name,
                    item_type,
                    self.settings.identity_attempts,
                    self.settings.identity_poll,
                )
                .await?
            }
        };
        tracing::info!(kind = %kind, id = %id, "created item");
        Ok(ItemOutcome {
            kind,
            id,
            action: PublishAction::Created,
        })
    }

    /// A create whose response was lost may still have succeeded.
    async fn adopt_after_lost_create(
        &self,
        plan: &RegionPlan,
        kind: ArtifactKind,
        message: String,
    ) -> Result<ItemOutcome, PublishError> {
        tracing::warn!(
            kind = %kind,
            display_name = %plan.report_name,
            error = %message,
            "create request failed in transit, checking whether the item exists"
        );
        let existing = self.lookup(&plan.report_name).await?;
        match existing.get(kind.item_type()) {
            Some(id) => Ok(ItemOutcome {
                kind,
                id: id.to_string(),
                action: PublishAction::Adopted,
            }),
            None => Err(WorkspaceError::Network(message).into()),
        }
    }

    async fn wait_if_async(&self, response: &SubmitResponse) -> Result<(), PublishError> {
        let Some(url) = response.operation_url() else {
            return Ok(());
        };
        // The first poll honors the submit response's Retry-After
        let first_delay = match response.retry_after.as_deref() {
            Some(value) => parse_retry_after(Some(value), self.settings.operation_poll),
            None => Duration::ZERO,
        };
        wait_for_operation(
            self.workspace.as_ref(),
            self.sleeper.as_ref(),
            url,
            first_delay,
            self.settings.operation_timeout,
            self.settings.operation_poll,
        )
        .await?;
        Ok(())
    }
}

/// Point the plan's local report definition at semantic model `model_id`.
pub fn bind_report(plan: &RegionPlan, model_id: &str) -> Result<(), MetadataError> {
    let mut definition = ReportDefinition::load(&plan.report_definition)?;
    definition.bind_to_semantic_model(model_id);
    definition.save(&plan.report_definition)
}

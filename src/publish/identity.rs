//! publish::identity
//!
//! Finding the remote id of an item.
//!
//! Existing items are matched on exact display name and type. A freshly
//! created item's id is taken from the create response when the service
//! returns it, otherwise the item listing is polled until it appears.

use std::time::Duration;

use serde_json::Value;

use super::sleeper::Sleeper;
use super::PublishError;
use crate::core::types::ItemType;
use crate::workspace::{RemoteItem, SubmitResponse, Workspace};

/// Body keys that may carry a created item's id, in lookup order.
const ID_KEYS: [&str; 4] = ["id", "itemId", "semanticModelId", "reportId"];

/// Ids of the items already published under one display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingItems {
    pub model: Option<String>,
    pub report: Option<String>,
}

impl ExistingItems {
    /// Partition `items` named `display_name` by type.
    pub fn from_items(items: &[RemoteItem], display_name: &str) -> Self {
        Self {
            model: find_item(items, display_name, ItemType::SemanticModel).map(|i| i.id.clone()),
            report: find_item(items, display_name, ItemType::Report).map(|i| i.id.clone()),
        }
    }

    pub fn get(&self, item_type: ItemType) -> Option<&str> {
        match item_type {
            ItemType::SemanticModel => self.model.as_deref(),
            ItemType::Report => self.report.as_deref(),
        }
    }
}

/// First item of `item_type` named exactly `display_name`.
pub fn find_item<'a>(
    items: &'a [RemoteItem],
    display_name: &str,
    item_type: ItemType,
) -> Option<&'a RemoteItem> {
    let mut matches = items.iter().filter(|item| item.matches(display_name, item_type));
    let first = matches.next();
    if first.is_some() && matches.next().is_some() {
        tracing::warn!(
            display_name,
            item_type = %item_type,
            "several items share this name, using the first listed"
        );
    }
    first
}

/// The created item's id as reported by the create response itself.
///
/// Checks the JSON body first, then a `Location` header pointing at the
/// item (an operation URL identifies the operation, not the item).
pub fn extract_id(response: &SubmitResponse) -> Option<String> {
    if let Some(Value::Object(body)) = &response.body {
        let from_body = ID_KEYS
            .iter()
            .filter_map(|key| body.get(*key).and_then(Value::as_str))
            .find(|id| !id.is_empty());
        if let Some(id) = from_body {
            return Some(id.to_string());
        }
    }

    if response.operation_url().is_some() {
        return None;
    }
    let location = response.location.as_deref()?;
    let last = location.split('/').filter(|s| !s.is_empty()).last()?;
    let id = last.split('?').next().unwrap_or_default();
    (!id.is_empty()).then(|| id.to_string())
}

/// Poll the item listing until `display_name` of `item_type` shows up.
///
/// Lists at most `attempts` times, sleeping `poll` between attempts.
///
/// # Errors
///
/// `PublishError::IdentityUnresolved` once every attempt has missed.
pub async fn resolve_by_listing(
    workspace: &dyn Workspace,
    sleeper: &dyn Sleeper,
    display_name: &str,
    item_type: ItemType,
    attempts: u32,
    poll: Duration,
) -> Result<String, PublishError> {
    for attempt in 1..=attempts {
        let items = workspace.list_items().await?;
        if let Some(item) = find_item(&items, display_name, item_type) {
            tracing::debug!(display_name, item_type = %item_type, attempt, id = %item.id, "resolved item id");
            return Ok(item.id.clone());
        }
        if attempt < attempts {
            sleeper.sleep(poll).await;
        }
    }

    Err(PublishError::IdentityUnresolved {
        display_name: display_name.to_string(),
        item_type,
        attempts,
    })
}

//! workspace::traits
//!
//! Workspace trait definition for the remote item store.
//!
//! # Design
//!
//! The `Workspace` trait is async because every operation is network I/O.
//! It exposes only the three primitives publishing needs: list items,
//! submit a definition (create or update), and read a long-running
//! operation. Sequencing, identity resolution, and polling policy live in
//! the publisher.
//!
//! # Retries
//!
//! Implementations may retry idempotent reads (`list_items`,
//! `get_operation`) on transient failures. `submit_definition` must be
//! attempted exactly once: a blind retry of a create could produce a
//! duplicate item.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::types::ItemType;

/// Statuses on which an idempotent request is retried.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Errors from workspace operations.
#[derive(Debug, Clone, Error)]
pub enum WorkspaceError {
    /// A bearer token could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Full response body
        body: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// A success response could not be parsed.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl WorkspaceError {
    /// Whether an idempotent request failing with this error may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkspaceError::Network(_) => true,
            WorkspaceError::Api { status, .. } => RETRYABLE_STATUSES.contains(status),
            _ => false,
        }
    }
}

/// An item as listed by the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
}

impl RemoteItem {
    /// Whether this item is `item_type` named `display_name`.
    pub fn matches(&self, display_name: &str, item_type: ItemType) -> bool {
        self.display_name == display_name && self.item_type == item_type.as_str()
    }
}

/// One file of an item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionPart {
    /// Path relative to the artifact directory, `/`-separated
    pub path: String,
    /// Base64-encoded file contents
    pub payload: String,
    /// Always `InlineBase64`
    pub payload_type: String,
}

impl DefinitionPart {
    pub fn inline_base64(path: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            payload: payload.into(),
            payload_type: "InlineBase64".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionParts {
    pub parts: Vec<DefinitionPart>,
}

/// Body of a create or update-definition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRequest {
    pub display_name: String,
    pub definition: DefinitionParts,
}

impl DefinitionRequest {
    pub fn new(display_name: impl Into<String>, parts: Vec<DefinitionPart>) -> Self {
        Self {
            display_name: display_name.into(),
            definition: DefinitionParts { parts },
        }
    }
}

/// Where a definition is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    /// Create a new item
    Create(ItemType),
    /// Replace the definition of an existing item
    Update { item_type: ItemType, id: String },
}

impl SubmitTarget {
    pub fn item_type(&self) -> ItemType {
        match self {
            SubmitTarget::Create(item_type) => *item_type,
            SubmitTarget::Update { item_type, .. } => *item_type,
        }
    }

    /// Path below the workspace URL.
    ///
    /// ```
    /// use regionforge::workspace::SubmitTarget;
    /// use regionforge::core::types::ItemType;
    ///
    /// assert_eq!(SubmitTarget::Create(ItemType::Report).path(), "reports");
    /// let update = SubmitTarget::Update { item_type: ItemType::SemanticModel, id: "42".into() };
    /// assert_eq!(update.path(), "semanticModels/42/updateDefinition");
    /// ```
    pub fn path(&self) -> String {
        match self {
            SubmitTarget::Create(item_type) => item_type.collection().to_string(),
            SubmitTarget::Update { item_type, id } => {
                format!("{}/{}/updateDefinition", item_type.collection(), id)
            }
        }
    }
}

/// A successful response to a definition submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmitResponse {
    /// HTTP status (200, 201 or 202)
    pub status: u16,
    /// Parsed JSON body, if any
    pub body: Option<Value>,
    /// `Location` header
    pub location: Option<String>,
    /// `Retry-After` header
    pub retry_after: Option<String>,
}

impl SubmitResponse {
    /// The long-running operation URL, if the submission was accepted
    /// asynchronously.
    pub fn operation_url(&self) -> Option<&str> {
        self.location
            .as_deref()
            .filter(|location| location.contains("/operations/"))
    }
}

/// One poll of a long-running operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationPoll {
    /// Parsed JSON body
    pub body: Value,
    /// `Retry-After` header
    pub retry_after: Option<String>,
}

/// The remote workspace holding semantic models and reports.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Implementation name (e.g. "fabric", "mock").
    fn name(&self) -> &'static str;

    /// List every item in the workspace.
    ///
    /// # Errors
    ///
    /// - `Api` on a non-success status (after retries for transient ones)
    /// - `Network` if the workspace cannot be reached
    async fn list_items(&self) -> Result<Vec<RemoteItem>, WorkspaceError>;

    /// Create an item or replace its definition. Never retried.
    ///
    /// # Errors
    ///
    /// - `Api` with the full body on any non-success status
    /// - `Network` if the request may or may not have reached the server
    async fn submit_definition(
        &self,
        target: &SubmitTarget,
        request: &DefinitionRequest,
    ) -> Result<SubmitResponse, WorkspaceError>;

    /// Read the state of a long-running operation.
    async fn get_operation(&self, url: &str) -> Result<OperationPoll, WorkspaceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn retryable_errors() {
        assert!(WorkspaceError::Network("reset".into()).is_retryable());
        for status in RETRYABLE_STATUSES {
            assert!(WorkspaceError::Api {
                status,
                body: String::new()
            }
            .is_retryable());
        }
        assert!(!WorkspaceError::Api {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!WorkspaceError::Auth("x".into()).is_retryable());
    }

    #[test]
    fn api_error_carries_body() {
        let err = WorkspaceError::Api {
            status: 400,
            body: "{\"errorCode\":\"InvalidDefinition\"}".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error: 400 - {\"errorCode\":\"InvalidDefinition\"}"
        );
    }

    #[test]
    fn definition_request_wire_shape() {
        let request = DefinitionRequest::new(
            "Sales_EMEA",
            vec![DefinitionPart::inline_base64(".platform", "e30=")],
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "displayName": "Sales_EMEA",
                "definition": {"parts": [
                    {"path": ".platform", "payload": "e30=", "payloadType": "InlineBase64"}
                ]}
            })
        );
    }

    #[test]
    fn remote_item_parses_listing_entry() {
        let item: RemoteItem = serde_json::from_value(json!({
            "id": "abc",
            "displayName": "Sales_EMEA",
            "type": "SemanticModel",
            "workspaceId": "ws"
        }))
        .unwrap();
        assert!(item.matches("Sales_EMEA", ItemType::SemanticModel));
        assert!(!item.matches("Sales_EMEA", ItemType::Report));
    }

    #[test]
    fn operation_url_requires_operations_segment() {
        let response = SubmitResponse {
            status: 202,
            location: Some("https://api.example.invalid/v1/operations/op-1".into()),
            ..Default::default()
        };
        assert!(response.operation_url().is_some());

        let response = SubmitResponse {
            status: 201,
            location: Some("https://api.example.invalid/v1/workspaces/ws/reports/r-1".into()),
            ..Default::default()
        };
        assert!(response.operation_url().is_none());
    }
}

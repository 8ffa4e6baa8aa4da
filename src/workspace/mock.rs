//! workspace::mock
//!
//! Mock workspace implementation for deterministic testing.
//!
//! # Design
//!
//! The mock workspace stores items in memory and records every call. How a
//! create is answered is configurable through [`CreateResponse`], so tests
//! can drive each identity-resolution path of the publisher. Failures are
//! injected with [`FailOn`].
//!
//! # Example
//!
//! ```
//! use regionforge::core::types::ItemType;
//! use regionforge::workspace::mock::MockWorkspace;
//! use regionforge::workspace::{DefinitionRequest, SubmitTarget, Workspace};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let workspace = MockWorkspace::new();
//! let response = workspace
//!     .submit_definition(
//!         &SubmitTarget::Create(ItemType::SemanticModel),
//!         &DefinitionRequest::new("Sales_EMEA", vec![]),
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(response.status, 201);
//! assert_eq!(workspace.list_items().await.unwrap().len(), 1);
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::traits::{
    DefinitionRequest, OperationPoll, RemoteItem, SubmitResponse, SubmitTarget, Workspace,
    WorkspaceError,
};
use crate::core::types::ItemType;

/// Base URL used in mock `Location` headers.
pub const MOCK_API_BASE: &str = "https://mock.invalid/v1";

/// Mock workspace for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockWorkspace {
    inner: Arc<Mutex<MockWorkspaceInner>>,
}

#[derive(Debug)]
struct MockWorkspaceInner {
    /// Items visible to `list_items`.
    items: Vec<RemoteItem>,
    /// Latest definition submitted per item id.
    definitions: HashMap<String, DefinitionRequest>,
    next_id: u64,
    next_operation: u64,
    create_response: CreateResponse,
    /// States returned by successive `get_operation` calls.
    operation_states: VecDeque<Value>,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// How a successful create is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateResponse {
    /// 201 with `{"id": ...}` in the body
    #[default]
    BodyId,
    /// 201 with an empty body and the item URL in `Location`
    Location,
    /// 202 with an operation URL in `Location`; the item is listed at once
    Async,
    /// 202 with neither body nor `Location`; the item is listed at once
    Silent,
    /// 202 with neither body nor `Location`; the item never shows up in
    /// listings
    Hidden,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_items with the given error.
    ListItems(WorkspaceError),
    /// Fail creates with the given error, without creating anything.
    Create(WorkspaceError),
    /// Fail updates with the given error.
    Update(WorkspaceError),
    /// Fail get_operation with the given error.
    GetOperation(WorkspaceError),
    /// Create the item, then report a network error to the caller.
    CreateLostResponse,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOperation {
    ListItems,
    Submit {
        target: SubmitTarget,
        display_name: String,
        paths: Vec<String>,
    },
    GetOperation {
        url: String,
    },
}

impl MockWorkspace {
    /// Create a new empty mock workspace.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockWorkspaceInner {
                items: Vec::new(),
                definitions: HashMap::new(),
                next_id: 1,
                next_operation: 1,
                create_response: CreateResponse::default(),
                operation_states: VecDeque::new(),
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Create a mock workspace that already holds `items`.
    pub fn with_items(items: Vec<RemoteItem>) -> Self {
        let workspace = Self::new();
        workspace.lock().items = items;
        workspace
    }

    /// Answer creates with `response`.
    pub fn create_response(self, response: CreateResponse) -> Self {
        self.lock().create_response = response;
        self
    }

    /// Return `states` from successive operation polls. Once exhausted,
    /// polls report `Succeeded`.
    pub fn operation_states(self, states: Vec<Value>) -> Self {
        self.lock().operation_states = states.into();
        self
    }

    /// Configure a failure.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Count recorded operations matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&MockOperation) -> bool) -> usize {
        self.lock().operations.iter().filter(|op| predicate(op)).count()
    }

    /// Items currently visible in listings.
    pub fn items(&self) -> Vec<RemoteItem> {
        self.lock().items.clone()
    }

    /// The latest definition submitted for `id`.
    pub fn definition(&self, id: &str) -> Option<DefinitionRequest> {
        self.lock().definitions.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MockWorkspaceInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Option<WorkspaceError> {
        match (&self.lock().fail_on, expected) {
            (Some(FailOn::ListItems(e)), "list_items")
            | (Some(FailOn::Create(e)), "create")
            | (Some(FailOn::Update(e)), "update")
            | (Some(FailOn::GetOperation(e)), "get_operation") => Some(e.clone()),
            _ => None,
        }
    }

    fn operation_url(inner: &mut MockWorkspaceInner) -> String {
        let url = format!("{}/operations/op-{}", MOCK_API_BASE, inner.next_operation);
        inner.next_operation += 1;
        url
    }

    fn create(&self, item_type: ItemType, request: &DefinitionRequest) -> SubmitResponse {
        let mut inner = self.lock();
        let id = format!("{}-{}", item_type.collection(), inner.next_id);
        inner.next_id += 1;

        let mode = inner.create_response;
        if mode != CreateResponse::Hidden {
            inner.items.push(RemoteItem {
                id: id.clone(),
                display_name: request.display_name.clone(),
                item_type: item_type.as_str().to_string(),
            });
        }
        inner.definitions.insert(id.clone(), request.clone());

        match mode {
            CreateResponse::BodyId => SubmitResponse {
                status: 201,
                body: Some(json!({ "id": id, "displayName": request.display_name })),
                ..Default::default()
            },
            CreateResponse::Location => SubmitResponse {
                status: 201,
                location: Some(format!(
                    "{}/workspaces/mock/{}/{}",
                    MOCK_API_BASE,
                    item_type.collection(),
                    id
                )),
                ..Default::default()
            },
            CreateResponse::Async => SubmitResponse {
                status: 202,
                location: Some(Self::operation_url(&mut inner)),
                retry_after: Some("1".into()),
                ..Default::default()
            },
            CreateResponse::Silent | CreateResponse::Hidden => SubmitResponse {
                status: 202,
                ..Default::default()
            },
        }
    }

    fn update(&self, id: &str, request: &DefinitionRequest) -> Result<SubmitResponse, WorkspaceError> {
        let mut inner = self.lock();
        if !inner.items.iter().any(|item| item.id == id) {
            return Err(WorkspaceError::Api {
                status: 404,
                body: format!("{{\"errorCode\":\"ItemNotFound\",\"message\":\"{}\"}}", id),
            });
        }
        inner.definitions.insert(id.to_string(), request.clone());

        if inner.create_response == CreateResponse::Async {
            Ok(SubmitResponse {
                status: 202,
                location: Some(Self::operation_url(&mut inner)),
                ..Default::default()
            })
        } else {
            Ok(SubmitResponse {
                status: 200,
                ..Default::default()
            })
        }
    }
}

impl Default for MockWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Workspace for MockWorkspace {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_items(&self) -> Result<Vec<RemoteItem>, WorkspaceError> {
        self.record(MockOperation::ListItems);
        if let Some(e) = self.check_fail("list_items") {
            return Err(e);
        }
        Ok(self.items())
    }

    async fn submit_definition(
        &self,
        target: &SubmitTarget,
        request: &DefinitionRequest,
    ) -> Result<SubmitResponse, WorkspaceError> {
        self.record(MockOperation::Submit {
            target: target.clone(),
            display_name: request.display_name.clone(),
            paths: request
                .definition
                .parts
                .iter()
                .map(|part| part.path.clone())
                .collect(),
        });

        match target {
            SubmitTarget::Create(item_type) => {
                if let Some(e) = self.check_fail("create") {
                    return Err(e);
                }
                let lost = matches!(self.lock().fail_on, Some(FailOn::CreateLostResponse));
                let response = self.create(*item_type, request);
                if lost {
                    return Err(WorkspaceError::Network("connection reset by peer".into()));
                }
                Ok(response)
            }
            SubmitTarget::Update { id, .. } => {
                if let Some(e) = self.check_fail("update") {
                    return Err(e);
                }
                self.update(id, request)
            }
        }
    }

    async fn get_operation(&self, url: &str) -> Result<OperationPoll, WorkspaceError> {
        self.record(MockOperation::GetOperation {
            url: url.to_string(),
        });
        if let Some(e) = self.check_fail("get_operation") {
            return Err(e);
        }

        let body = self
            .lock()
            .operation_states
            .pop_front()
            .unwrap_or_else(|| json!({ "status": "Succeeded" }));
        Ok(OperationPoll {
            body,
            retry_after: None,
        })
    }
}

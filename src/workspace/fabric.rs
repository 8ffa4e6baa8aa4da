//! workspace::fabric
//!
//! Workspace implementation over the Fabric REST API.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list | `GET {api_base}/workspaces/{ws}/items` |
//! | create | `POST {api_base}/workspaces/{ws}/{semanticModels,reports}` |
//! | update | `POST {api_base}/workspaces/{ws}/{collection}/{id}/updateDefinition` |
//! | operation | `GET <Location header of a 202>` |
//!
//! Every request carries `Authorization: Bearer <token>` from the
//! configured [`TokenProvider`] and `Content-Type: application/json`.
//!
//! # Retries
//!
//! GET requests are retried with exponential backoff on network errors and
//! on 429/500/502/503/504. POST requests are sent once.
//!
//! [`TokenProvider`]: crate::auth::TokenProvider

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION, RETRY_AFTER};
use reqwest::{Client, Response};
use serde_json::Value;

use super::traits::{
    DefinitionRequest, OperationPoll, RemoteItem, SubmitResponse, SubmitTarget, Workspace,
    WorkspaceError,
};
use crate::auth::TokenProvider;
use crate::core::config::PublishSettings;

/// Upper bound on the delay between two GET retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Upper bound on `continuationUri` pages followed by one listing.
const MAX_LIST_PAGES: usize = 1000;

/// Workspace client for one Fabric workspace.
pub struct FabricWorkspace {
    client: Client,
    token_provider: Arc<dyn TokenProvider>,
    api_base: String,
    workspace_id: String,
    request_timeout: Duration,
    deploy_timeout: Duration,
    retry_count: u32,
    retry_backoff: Duration,
}

// Custom Debug to avoid exposing anything the token provider holds
impl std::fmt::Debug for FabricWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FabricWorkspace")
            .field("api_base", &self.api_base)
            .field("workspace_id", &self.workspace_id)
            .field("authenticated", &self.token_provider.is_authenticated())
            .finish()
    }
}

impl FabricWorkspace {
    /// Create a client for `workspace_id` using the endpoints and timeouts
    /// in `settings`.
    pub fn new(
        provider: Arc<dyn TokenProvider>,
        workspace_id: impl Into<String>,
        settings: &PublishSettings,
    ) -> Self {
        Self {
            client: Client::new(),
            token_provider: provider,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            workspace_id: workspace_id.into(),
            request_timeout: settings.request_timeout,
            deploy_timeout: settings.deploy_timeout,
            retry_count: settings.retry_count,
            retry_backoff: settings.retry_backoff,
        }
    }

    fn workspace_url(&self, path: &str) -> String {
        format!("{}/workspaces/{}/{}", self.api_base, self.workspace_id, path)
    }

    async fn get_bearer_token(&self) -> Result<String, WorkspaceError> {
        self.token_provider
            .bearer_token()
            .await
            .map_err(|e| WorkspaceError::Auth(e.to_string()))
    }

    async fn headers(&self) -> Result<HeaderMap, WorkspaceError> {
        let token = self.get_bearer_token().await?;
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| WorkspaceError::Auth("access token is not a valid header value".into()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.retry_backoff)
            .with_max_delay(MAX_RETRY_DELAY.max(self.retry_backoff))
            .with_max_times(self.retry_count as usize)
    }

    /// One GET attempt, returning the parsed body and `Retry-After`.
    async fn get_once(&self, url: &str) -> Result<(Value, Option<String>), WorkspaceError> {
        let response = self
            .client
            .get(url)
            .headers(self.headers().await?)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let retry_after = header_string(&response, RETRY_AFTER.as_str());
        if !status.is_success() {
            return Err(error_response(response).await);
        }

        let text = response.text().await.map_err(network_error)?;
        if text.trim().is_empty() {
            return Ok((Value::Null, retry_after));
        }
        let body = serde_json::from_str(&text)
            .map_err(|e| WorkspaceError::Parse(format!("{}: {}", url, e)))?;
        Ok((body, retry_after))
    }

    /// GET with retries on transient failures.
    async fn get_json(&self, url: &str) -> Result<(Value, Option<String>), WorkspaceError> {
        (|| async move { self.get_once(url).await })
            .retry(self.backoff())
            .when(WorkspaceError::is_retryable)
            .notify(|err: &WorkspaceError, delay: Duration| {
                tracing::warn!(url = %url, error = %err, delay_ms = delay.as_millis() as u64, "retrying request");
            })
            .await
    }
}

#[async_trait]
impl Workspace for FabricWorkspace {
    fn name(&self) -> &'static str {
        "fabric"
    }

    async fn list_items(&self) -> Result<Vec<RemoteItem>, WorkspaceError> {
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.workspace_url("items"));

        while let Some(url) = next.take() {
            if visited.len() >= MAX_LIST_PAGES {
                return Err(WorkspaceError::Parse(format!(
                    "item listing exceeded {} pages",
                    MAX_LIST_PAGES
                )));
            }
            if !visited.insert(url.clone()) {
                return Err(WorkspaceError::Parse(format!(
                    "continuationUri repeats an earlier page: {}",
                    url
                )));
            }
            tracing::debug!(url = %url, page = visited.len(), "listing workspace items");
            let (body, _) = self.get_json(&url).await?;
            items.extend(parse_items(&body)?);
            next = body
                .get("continuationUri")
                .and_then(Value::as_str)
                .filter(|uri| !uri.is_empty())
                .map(str::to_string);
        }

        Ok(items)
    }

    async fn submit_definition(
        &self,
        target: &SubmitTarget,
        request: &DefinitionRequest,
    ) -> Result<SubmitResponse, WorkspaceError> {
        let url = self.workspace_url(&target.path());
        tracing::debug!(
            url = %url,
            display_name = %request.display_name,
            parts = request.definition.parts.len(),
            "submitting definition"
        );

        let response = self
            .client
            .post(&url)
            .headers(self.headers().await?)
            .timeout(self.deploy_timeout)
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_response(response).await);
        }

        let location = header_string(&response, LOCATION.as_str());
        let retry_after = header_string(&response, RETRY_AFTER.as_str());
        let text = response.text().await.map_err(network_error)?;
        // Bodies of 202 responses are often empty or not JSON at all
        let body = serde_json::from_str::<Value>(&text)
            .ok()
            .filter(|value| !value.is_null());

        tracing::debug!(status = status.as_u16(), location = ?location, "definition accepted");
        Ok(SubmitResponse {
            status: status.as_u16(),
            body,
            location,
            retry_after,
        })
    }

    async fn get_operation(&self, url: &str) -> Result<OperationPoll, WorkspaceError> {
        let (body, retry_after) = self.get_json(url).await?;
        Ok(OperationPoll { body, retry_after })
    }
}

/// Items of a listing page: the `value` array, or the body itself when it
/// is already an array.
fn parse_items(body: &Value) -> Result<Vec<RemoteItem>, WorkspaceError> {
    let entries = match body.get("value").unwrap_or(body) {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(WorkspaceError::Parse(format!(
                "item listing is not an array: {}",
                other
            )))
        }
    };

    // Entries without an id cannot be targeted; skip rather than fail
    Ok(entries
        .iter()
        .filter_map(|entry| serde_json::from_value::<RemoteItem>(entry.clone()).ok())
        .collect())
}

fn header_string(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn network_error(e: reqwest::Error) -> WorkspaceError {
    WorkspaceError::Network(e.to_string())
}

async fn error_response(response: Response) -> WorkspaceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status, body = %body, "workspace API error");
    WorkspaceError::Api { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::core::types::ItemType;
    use crate::workspace::DefinitionPart;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticToken(&'static str);

    #[async_trait]
    impl TokenProvider for StaticToken {
        async fn bearer_token(&self) -> Result<String, AuthError> {
            Ok(self.0.to_string())
        }

        fn is_authenticated(&self) -> bool {
            true
        }
    }

    struct FailingToken;

    #[async_trait]
    impl TokenProvider for FailingToken {
        async fn bearer_token(&self) -> Result<String, AuthError> {
            Err(AuthError::TokenRequest {
                status: 401,
                message: "invalid_client".into(),
            })
        }

        fn is_authenticated(&self) -> bool {
            false
        }
    }

    fn settings(server: &MockServer) -> PublishSettings {
        PublishSettings {
            api_base: format!("{}/v1", server.uri()),
            retry_count: 2,
            retry_backoff: Duration::from_millis(5),
            ..PublishSettings::default()
        }
    }

    fn workspace(server: &MockServer) -> FabricWorkspace {
        FabricWorkspace::new(Arc::new(StaticToken("tok")), "ws-1", &settings(server))
    }

    fn request() -> DefinitionRequest {
        DefinitionRequest::new(
            "Sales_EMEA",
            vec![DefinitionPart::inline_base64(".platform", "e30=")],
        )
    }

    #[tokio::test]
    async fn list_items_sends_bearer_and_parses_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/workspaces/ws-1/items"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"id": "m1", "displayName": "Sales_EMEA", "type": "SemanticModel"},
                    {"id": "r1", "displayName": "Sales_EMEA", "type": "Report"},
                    {"displayName": "no id", "type": "Lakehouse"}
                ]
            })))
            .mount(&server)
            .await;

        let items = workspace(&server).list_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].matches("Sales_EMEA", ItemType::SemanticModel));
    }

    #[tokio::test]
    async fn list_items_accepts_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "m1", "displayName": "A", "type": "SemanticModel"}
            ])))
            .mount(&server)
            .await;

        let items = workspace(&server).list_items().await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn list_items_follows_continuation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/workspaces/ws-1/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "a", "displayName": "A", "type": "Report"}],
                "continuationUri": format!("{}/v1/page2", server.uri())
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "b", "displayName": "B", "type": "Report"}]
            })))
            .mount(&server)
            .await;

        let ids: Vec<_> = workspace(&server)
            .list_items()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn list_items_stops_on_repeated_continuation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/workspaces/ws-1/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "a", "displayName": "A", "type": "Report"}],
                "continuationUri": format!("{}/v1/workspaces/ws-1/items", server.uri())
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = workspace(&server).list_items().await.unwrap_err();
        match err {
            WorkspaceError::Parse(message) => assert!(message.contains("repeats")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn get_retries_transient_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
            .mount(&server)
            .await;

        assert!(workspace(&server).list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_gives_up_after_retry_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let err = workspace(&server).list_items().await.unwrap_err();
        assert!(matches!(err, WorkspaceError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn get_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such workspace"))
            .expect(1)
            .mount(&server)
            .await;

        let err = workspace(&server).list_items().await.unwrap_err();
        match err {
            WorkspaceError::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such workspace");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn create_posts_definition_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/workspaces/ws-1/semanticModels"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "displayName": "Sales_EMEA",
                "definition": {"parts": [
                    {"path": ".platform", "payload": "e30=", "payloadType": "InlineBase64"}
                ]}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "m-new"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = workspace(&server)
            .submit_definition(&SubmitTarget::Create(ItemType::SemanticModel), &request())
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, Some(json!({"id": "m-new"})));
    }

    #[tokio::test]
    async fn accepted_submit_exposes_operation() {
        let server = MockServer::start().await;
        let location = format!("{}/v1/operations/op-9", server.uri());
        Mock::given(method("POST"))
            .and(path("/v1/workspaces/ws-1/reports/r1/updateDefinition"))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Location", location.as_str())
                    .insert_header("Retry-After", "7"),
            )
            .mount(&server)
            .await;

        let target = SubmitTarget::Update {
            item_type: ItemType::Report,
            id: "r1".into(),
        };
        let response = workspace(&server)
            .submit_definition(&target, &request())
            .await
            .unwrap();
        assert_eq!(response.status, 202);
        assert!(response.body.is_none());
        assert_eq!(response.operation_url(), Some(location.as_str()));
        assert_eq!(response.retry_after.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn submit_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let err = workspace(&server)
            .submit_definition(&SubmitTarget::Create(ItemType::Report), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn get_operation_returns_body_and_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/operations/op-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Retry-After", "3")
                    .set_body_json(json!({"status": "Running"})),
            )
            .mount(&server)
            .await;

        let poll = workspace(&server)
            .get_operation(&format!("{}/v1/operations/op-1", server.uri()))
            .await
            .unwrap();
        assert_eq!(poll.body, json!({"status": "Running"}));
        assert_eq!(poll.retry_after.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn token_failure_is_auth_error() {
        let server = MockServer::start().await;
        let workspace = FabricWorkspace::new(Arc::new(FailingToken), "ws-1", &settings(&server));
        let err = workspace.list_items().await.unwrap_err();
        assert!(matches!(err, WorkspaceError::Auth(_)));
    }

    #[test]
    fn debug_hides_provider() {
        let workspace = FabricWorkspace::new(
            Arc::new(StaticToken("secret-token")),
            "ws-1",
            &PublishSettings::default(),
        );
        let debug = format!("{:?}", workspace);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("ws-1"));
    }

    #[test]
    fn parse_items_rejects_non_array() {
        assert!(parse_items(&json!({"value": "nope"})).is_err());
        assert!(parse_items(&Value::Null).unwrap().is_empty());
    }
}

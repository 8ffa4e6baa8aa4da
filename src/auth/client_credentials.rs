//! auth::client_credentials
//!
//! OAuth2 client-credentials grant for a service principal.
//!
//! # Flow
//!
//! 1. POST a form to `{authority}/{tenant}/oauth2/v2.0/token` with
//!    `client_id`, `client_secret`, `grant_type=client_credentials` and the
//!    workspace API scope
//! 2. Cache the returned access token until shortly before `expires_in`
//! 3. Request a new token when the cached one is about to expire
//!
//! Token requests are never retried here; a failure surfaces as
//! [`AuthError`] and ends the run.
//!
//! # Example
//!
//! ```no_run
//! use regionforge::auth::{ClientCredentials, ClientCredentialsProvider, TokenProvider};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), regionforge::auth::AuthError> {
//! let credentials = ClientCredentials::new("tenant", "client", "secret");
//! let provider = ClientCredentialsProvider::new(
//!     credentials,
//!     "https://login.microsoftonline.com",
//!     "https://api.fabric.microsoft.com/.default",
//!     Duration::from_secs(60),
//! )?;
//! let token = provider.bearer_token().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;

use super::credentials::ClientCredentials;
use super::errors::AuthError;
use super::TokenProvider;

/// Seconds before expiry at which a cached token is considered stale.
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// Lifetime assumed when the endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Successful token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Error response from the token endpoint.
#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    error_description: Option<String>,
}

/// A cached access token.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn needs_refresh(&self) -> bool {
        let buffer = chrono::Duration::seconds(EXPIRY_BUFFER_SECS);
        Utc::now() >= self.expires_at - buffer
    }
}

/// [`TokenProvider`] backed by the client-credentials grant.
pub struct ClientCredentialsProvider {
    client: Client,
    token_url: String,
    scope: String,
    credentials: ClientCredentials,
    cached: Mutex<Option<CachedToken>>,
}

// Custom Debug to avoid exposing the secret or the cached token
impl std::fmt::Debug for ClientCredentialsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsProvider")
            .field("token_url", &self.token_url)
            .field("scope", &self.scope)
            .field("client_id", &self.credentials.client_id)
            .field("has_cached_token", &self.cached_token().is_some())
            .finish()
    }
}

impl ClientCredentialsProvider {
    /// Create a provider for `credentials` against `authority`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the HTTP client cannot be built.
    pub fn new(
        credentials: ClientCredentials,
        authority: &str,
        scope: &str,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            token_url: token_url(authority, &credentials.tenant_id),
            scope: scope.to_string(),
            credentials,
            cached: Mutex::new(None),
        })
    }

    /// The token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn cached_token(&self) -> Option<CachedToken> {
        let cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        cached.as_ref().filter(|t| !t.needs_refresh()).cloned()
    }

    /// Request a fresh token from the endpoint.
    async fn request_token(&self) -> Result<CachedToken, AuthError> {
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret()),
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];

        tracing::debug!(url = %self.token_url, "requesting access token");
        let response = self
            .client
            .post(&self.token_url)
            .headers(Self::headers())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
                AuthError::InvalidResponse(format!("failed to parse token response: {}", e))
            })?;
            if token.access_token.is_empty() {
                return Err(AuthError::InvalidResponse(
                    "token response has an empty access_token".into(),
                ));
            }
            let lifetime = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
            Ok(CachedToken {
                access_token: token.access_token,
                expires_at: Utc::now() + chrono::Duration::seconds(lifetime as i64),
            })
        } else {
            let message = match serde_json::from_str::<OAuthError>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            Err(AuthError::TokenRequest {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_token() {
            return Ok(token.access_token);
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(fresh);
        Ok(access_token)
    }

    fn is_authenticated(&self) -> bool {
        self.cached_token().is_some()
    }
}

/// Token endpoint for `tenant` under `authority`.
///
/// ```
/// use regionforge::auth::token_url;
///
/// assert_eq!(
///     token_url("https://login.microsoftonline.com", "contoso"),
///     "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
/// );
/// ```
pub fn token_url(authority: &str, tenant: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority.trim_end_matches('/'),
        tenant
    )
}

//! auth - service principal authentication for the workspace API
//!
//! # Architecture
//!
//! - Credentials come from a [`SecretSource`](crate::secrets::SecretSource)
//!   (environment variables in the CLI)
//! - Tokens come from the OAuth2 client-credentials grant
//! - Tokens are cached in memory for the lifetime of the provider and
//!   refreshed shortly before expiry
//!
//! # Components
//!
//! - [`TokenProvider`] - Trait for providing bearer tokens to the workspace client
//! - [`ClientCredentialsProvider`] - Client-credentials implementation
//! - [`load_credentials`] - Reads credentials and the workspace id
//!
//! # Security
//!
//! The client secret and access tokens never appear in logs, errors, or
//! `Debug` output.

mod client_credentials;
mod credentials;
mod errors;

pub use client_credentials::{token_url, ClientCredentialsProvider, EXPIRY_BUFFER_SECS};
pub use credentials::{
    load_credentials, ClientCredentials, PublishCredentials, CLIENT_ID_VAR, CLIENT_SECRET_VAR,
    TENANT_ID_VAR, WORKSPACE_ID_VARS,
};
pub use errors::AuthError;

/// Trait for providing bearer tokens to the workspace client.
///
/// # Example
///
/// ```ignore
/// use regionforge::auth::TokenProvider;
///
/// async fn call(provider: &dyn TokenProvider) -> Result<(), AuthError> {
///     let token = provider.bearer_token().await?;
///     // Use token in Authorization header
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a valid bearer token, requesting a new one if necessary.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenRequest`] if the token endpoint rejects the request
    /// - [`AuthError::Network`] if the endpoint cannot be reached
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Check if a usable token is cached, without requesting one.
    fn is_authenticated(&self) -> bool;
}

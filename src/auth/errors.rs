//! auth::errors
//!
//! Authentication error types.
//!
//! # Design
//!
//! Error messages never contain the client secret or an access token.
//! Token endpoint failures carry the server's error code and description,
//! which do not echo credentials.
//!
//! # Example
//!
//! ```
//! use regionforge::auth::AuthError;
//!
//! let err = AuthError::TokenRequest {
//!     status: 401,
//!     message: "invalid_client".to_string(),
//! };
//! assert!(err.to_string().contains("401"));
//! ```

use thiserror::Error;

/// Errors from obtaining a bearer token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint rejected the request.
    #[error("token request failed: {status} - {message}")]
    TokenRequest {
        /// HTTP status code
        status: u16,
        /// Error code and description from the token endpoint
        message: String,
    },

    /// The token endpoint answered with something other than a token.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// Network error while talking to the token endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// Internal error (should not happen).
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

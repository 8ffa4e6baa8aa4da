//! secrets::traits
//!
//! Secret source trait definition.
//!
//! # Design
//!
//! A `SecretSource` is a read-only key-value lookup. Keys are variable
//! names such as `AZURE_CLIENT_SECRET`. Implementations must never log,
//! print, or include secret values in error messages.
//!
//! # Example
//!
//! ```
//! use regionforge::secrets::{MemorySource, SecretSource};
//!
//! let source = MemorySource::new().with("AZURE_TENANT_ID", "tenant");
//! assert_eq!(source.get("AZURE_TENANT_ID").unwrap().as_deref(), Some("tenant"));
//! assert!(source.get("AZURE_CLIENT_ID").unwrap().is_none());
//! ```

use thiserror::Error;

/// Errors from secret lookups.
///
/// Messages name the key, never the value.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The value exists but cannot be read (e.g. not valid UTF-8).
    #[error("failed to read secret '{0}'")]
    Unreadable(String),
}

/// Read-only source of secrets.
pub trait SecretSource: Send + Sync {
    /// Get a secret by key.
    ///
    /// Returns `Ok(None)` if the key is unset or set to an empty string.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Get the first of `keys` that is set.
    fn get_any(&self, keys: &[&str]) -> Result<Option<String>, SecretError> {
        for key in keys {
            if let Some(value) = self.get(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

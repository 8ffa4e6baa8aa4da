//! secrets::env_source
//!
//! Secrets from process environment variables.

use std::env::{self, VarError};

use super::traits::{SecretError, SecretSource};

/// Reads secrets from the process environment.
///
/// Empty variables are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl EnvSource {
    /// Create a new environment source.
    pub fn new() -> Self {
        Self
    }
}

impl SecretSource for EnvSource {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        match env::var(key) {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(SecretError::Unreadable(key.to_string())),
        }
    }
}

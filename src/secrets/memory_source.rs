//! secrets::memory_source
//!
//! In-memory secret source for tests and embedding.

use std::collections::HashMap;

use super::traits::{SecretError, SecretSource};

/// Secrets held in a map.
#[derive(Clone, Default)]
pub struct MemorySource {
    values: HashMap<String, String>,
}

// Values are secrets; only the keys are shown.
impl std::fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("MemorySource").field("keys", &keys).finish()
    }
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SecretSource for MemorySource {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.values.get(key).filter(|v| !v.is_empty()).cloned())
    }
}

//! core::metadata::platform
//!
//! `.platform` files.
//!
//! Each artifact directory carries a platform file of the shape:
//!
//! ```json
//! {
//!     "$schema": "...",
//!     "metadata": {"type": "SemanticModel", "displayName": "Sales_EMEA"},
//!     "config": {"version": "2.0", "logicalId": "6a1f..."}
//! }
//! ```
//!
//! `config.logicalId` is the artifact's stable identity. It is assigned
//! once per (kind, region) and must survive every regeneration.

use std::path::Path;

use serde_json::Value;

use super::MetadataError;
use crate::core::fsutil;
use crate::core::json::{ensure_object, get_nested_str};
use crate::core::types::LogicalId;

/// A loaded platform file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformFile {
    doc: Value,
}

impl PlatformFile {
    /// Load a platform file from disk.
    ///
    /// # Errors
    ///
    /// - `MetadataError::Fs` if the file cannot be read or is not valid JSON
    /// - `MetadataError::NotAnObject` if the top level is not an object
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let doc = fsutil::read_json(path)?;
        Self::from_value(doc).ok_or_else(|| MetadataError::NotAnObject {
            path: path.to_path_buf(),
        })
    }

    /// Wrap an already-parsed document. Returns `None` unless it is an object.
    pub fn from_value(doc: Value) -> Option<Self> {
        doc.is_object().then_some(Self { doc })
    }

    /// Write the document back to `path`.
    pub fn save(&self, path: &Path) -> Result<(), MetadataError> {
        fsutil::write_json(path, &self.doc)?;
        Ok(())
    }

    /// `config.logicalId`, if present and non-empty.
    pub fn logical_id(&self) -> Option<LogicalId> {
        LogicalId::new(get_nested_str(&self.doc, &["config", "logicalId"], ""))
    }

    /// `metadata.displayName`, or `""` when absent.
    pub fn display_name(&self) -> &str {
        get_nested_str(&self.doc, &["metadata", "displayName"], "")
    }

    /// `metadata.type`, or `""` when absent.
    pub fn item_type(&self) -> &str {
        get_nested_str(&self.doc, &["metadata", "type"], "")
    }

    /// Set both `config.displayName` and `metadata.displayName`.
    pub fn set_display_name(&mut self, name: &str) {
        for section in ["config", "metadata"] {
            if let Some(obj) = ensure_object(&mut self.doc, &[section]) {
                obj.insert("displayName".to_string(), Value::String(name.to_string()));
            }
        }
    }

    /// Set `config.logicalId`.
    pub fn set_logical_id(&mut self, id: &LogicalId) {
        if let Some(config) = ensure_object(&mut self.doc, &["config"]) {
            config.insert(
                "logicalId".to_string(),
                Value::String(id.as_str().to_string()),
            );
        }
    }

    /// The underlying document.
    pub fn as_value(&self) -> &Value {
        &self.doc
    }
}

/// Read only the logical id of an existing platform file.
///
/// Returns `Ok(None)` if the file does not exist or carries no id.
pub fn read_existing_logical_id(path: &Path) -> Result<Option<LogicalId>, MetadataError> {
    if !path.is_file() {
        return Ok(None);
    }
    Ok(PlatformFile::load(path)?.logical_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Value {
        json!({
            "$schema": "https://example.invalid/platform.json",
            "metadata": {"type": "SemanticModel", "displayName": "Template"},
            "config": {"version": "2.0", "logicalId": "00000000-0000-0000-0000-000000000001"}
        })
    }

    #[test]
    fn reads_fields() {
        let platform = PlatformFile::from_value(sample()).unwrap();
        assert_eq!(platform.item_type(), "SemanticModel");
        assert_eq!(platform.display_name(), "Template");
        assert_eq!(
            platform.logical_id().unwrap().as_str(),
            "00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn set_display_name_updates_both_sections() {
        let mut platform = PlatformFile::from_value(sample()).unwrap();
        platform.set_display_name("Sales_EMEA");

        let doc = platform.as_value();
        assert_eq!(doc["config"]["displayName"], "Sales_EMEA");
        assert_eq!(doc["metadata"]["displayName"], "Sales_EMEA");
    }

    #[test]
    fn edits_preserve_unknown_keys() {
        let mut platform = PlatformFile::from_value(sample()).unwrap();
        platform.set_display_name("X");
        platform.set_logical_id(&LogicalId::new("abc").unwrap());

        let doc = platform.as_value();
        assert_eq!(doc["$schema"], "https://example.invalid/platform.json");
        assert_eq!(doc["config"]["version"], "2.0");
        assert_eq!(doc["metadata"]["type"], "SemanticModel");
        assert_eq!(doc["config"]["logicalId"], "abc");
    }

    #[test]
    fn missing_sections_are_created() {
        let mut platform = PlatformFile::from_value(json!({})).unwrap();
        assert!(platform.logical_id().is_none());
        assert_eq!(platform.display_name(), "");

        platform.set_logical_id(&LogicalId::new("abc").unwrap());
        platform.set_display_name("Y");
        assert_eq!(platform.logical_id().unwrap().as_str(), "abc");
        assert_eq!(platform.display_name(), "Y");
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(PlatformFile::from_value(json!([1])).is_none());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".platform");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = PlatformFile::load(&path).unwrap_err();
        assert!(matches!(err, MetadataError::NotAnObject { .. }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".platform");
        std::fs::write(&path, "{\"config\": ").unwrap();
        assert!(PlatformFile::load(&path).is_err());
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".platform");
        let mut platform = PlatformFile::from_value(sample()).unwrap();
        platform.set_display_name("Sales_APAC");
        platform.save(&path).unwrap();

        let reloaded = PlatformFile::load(&path).unwrap();
        assert_eq!(reloaded, platform);
    }

    #[test]
    fn existing_logical_id_of_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let id = read_existing_logical_id(&dir.path().join(".platform")).unwrap();
        assert!(id.is_none());
    }
}

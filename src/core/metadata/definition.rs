//! core::metadata::definition
//!
//! Model definition text and report definition JSON.
//!
//! # Model definition
//!
//! The model carries a region parameter as a text assignment, e.g. in
//! `definition/expressions.tmdl`:
//!
//! ```text
//! expression Region = "Template" meta [IsParameterQuery=true, ...]
//! ```
//!
//! The template's value of that parameter is a placeholder; instantiation
//! replaces every occurrence of it with the region code.
//!
//! # Report definition
//!
//! `definition.pbir` points the report at its model, either by a relative
//! directory path (local authoring) or by a connection string naming the
//! published model id (remote publishing).

use std::path::Path;

use regex::Regex;
use serde_json::{json, Value};

use super::MetadataError;
use crate::core::fsutil;
use crate::core::json::{ensure_object, get_nested_str};

/// Find the value assigned to `name` in definition text
/// (`name = "value"`, whitespace around `=` allowed).
///
/// Returns `None` if there is no such assignment.
///
/// # Example
///
/// ```
/// use regionforge::core::metadata::find_parameter_value;
///
/// let text = r#"expression Region = "Template" meta [IsParameterQuery=true]"#;
/// assert_eq!(find_parameter_value(text, "Region"), Some("Template".to_string()));
/// assert_eq!(find_parameter_value(text, "Country"), None);
/// ```
pub fn find_parameter_value(text: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"{}\s*=\s*"([^"]+)""#, regex::escape(name));
    // The pattern is built from an escaped literal and cannot be invalid.
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// A model definition file held as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDefinition {
    text: String,
}

impl ModelDefinition {
    /// Load from disk.
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        Ok(Self {
            text: fsutil::read_text(path)?,
        })
    }

    /// Wrap text already in memory.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Write back to disk.
    pub fn save(&self, path: &Path) -> Result<(), MetadataError> {
        fsutil::write_text(path, &self.text)?;
        Ok(())
    }

    /// Replace every occurrence of `placeholder` with `value`.
    ///
    /// Returns the number of replacements made. An empty placeholder is
    /// never substituted.
    pub fn replace_placeholder(&mut self, placeholder: &str, value: &str) -> usize {
        if placeholder.is_empty() {
            return 0;
        }
        let count = self.text.matches(placeholder).count();
        if count > 0 {
            self.text = self.text.replace(placeholder, value);
        }
        count
    }

    /// The definition text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A report definition (`definition.pbir`).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefinition {
    doc: Value,
}

impl ReportDefinition {
    /// Load from disk.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not JSON, or is not an object.
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

    /// Write back to disk.
    pub fn save(&self, path: &Path) -> Result<(), MetadataError> {
        fsutil::write_json(path, &self.doc)?;
        Ok(())
    }

    /// `datasetReference.byPath.path`, or `""` when the report is not
    /// bound by path.
    pub fn dataset_path(&self) -> &str {
        get_nested_str(&self.doc, &["datasetReference", "byPath", "path"], "")
    }

    /// `datasetReference.byConnection.connectionString`, if bound by connection.
    pub fn connection_string(&self) -> Option<&str> {
        let value = get_nested_str(
            &self.doc,
            &["datasetReference", "byConnection", "connectionString"],
            "",
        );
        (!value.is_empty()).then_some(value)
    }

    /// Bind the report to a model directory by relative path.
    ///
    /// Any connection-based binding is dropped; other keys under
    /// `byPath` are kept.
    pub fn set_dataset_path(&mut self, path: &str) {
        if let Some(reference) = ensure_object(&mut self.doc, &["datasetReference"]) {
            reference.remove("byConnection");
        }
        if let Some(by_path) = ensure_object(&mut self.doc, &["datasetReference", "byPath"]) {
            by_path.insert("path".to_string(), Value::String(path.to_string()));
        }
    }

    /// Bind the report to a published semantic model by id.
    ///
    /// Replaces the whole `datasetReference` with a `byConnection` entry, as
    /// the remote API rejects definitions that reference a local path.
    pub fn bind_to_semantic_model(&mut self, semantic_model_id: &str) {
        if let Some(root) = self.doc.as_object_mut() {
            root.insert(
                "datasetReference".to_string(),
                json!({
                    "byConnection": {
                        "connectionString": format!("semanticmodelid={}", semantic_model_id)
                    }
                }),
            );
        }
    }

    /// The underlying document.
    pub fn as_value(&self) -> &Value {
        &self.doc
    }
}

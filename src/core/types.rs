//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RegionCode`] - Validated region key (e.g. `Nordics`)
//! - [`ArtifactKind`] - Which half of a region's artifact pair (model or report)
//! - [`ItemType`] - Remote item type as reported by the workspace
//! - [`LogicalId`] - Stable per-artifact identity stored in platform files
//!
//! # Validation
//!
//! Region codes end up in directory names, so they are validated at
//! construction time. Invalid values cannot be represented.
//!
//! # Examples
//!
//! ```
//! use regionforge::core::types::{ArtifactKind, RegionCode};
//!
//! let region = RegionCode::new("Nordics").unwrap();
//! assert_eq!(region.as_str(), "Nordics");
//! assert_eq!(ArtifactKind::Model.as_str(), "model");
//!
//! assert!(RegionCode::new("").is_err());
//! assert!(RegionCode::new("../etc").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid region code: {0}")]
    InvalidRegionCode(String),

    #[error("unknown item type: {0}")]
    UnknownItemType(String),
}

/// A validated region code.
///
/// Region codes are concatenated into directory and display names, so they:
/// - Cannot be empty or all whitespace
/// - Cannot have leading or trailing whitespace
/// - Cannot contain path separators (`/`, `\`) or `..`
/// - Cannot contain ASCII control characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    /// Create a new validated region code.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRegionCode` if the code cannot be used
    /// as part of a directory name.
    pub fn new(code: impl Into<String>) -> Result<Self, TypeError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    fn validate(code: &str) -> Result<(), TypeError> {
        if code.trim().is_empty() {
            return Err(TypeError::InvalidRegionCode(
                "region code cannot be empty".into(),
            ));
        }
        if code.trim() != code {
            return Err(TypeError::InvalidRegionCode(format!(
                "region code '{}' has leading or trailing whitespace",
                code
            )));
        }
        if code.contains('/') || code.contains('\\') {
            return Err(TypeError::InvalidRegionCode(format!(
                "region code '{}' cannot contain path separators",
                code
            )));
        }
        if code.contains("..") {
            return Err(TypeError::InvalidRegionCode(format!(
                "region code '{}' cannot contain '..'",
                code
            )));
        }
        if code.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRegionCode(format!(
                "region code '{}' contains control characters",
                code
            )));
        }
        Ok(())
    }

    /// Get the region code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RegionCode {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.0
    }
}

impl AsRef<str> for RegionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two artifacts produced for every region.
///
/// The model is always processed before the report, because the report
/// references the model's directory (locally) or id (remotely).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Semantic model (data and measures)
    Model,
    /// Report bound to a semantic model
    Report,
}

impl ArtifactKind {
    /// Processing order within a region.
    pub const ORDER: [ArtifactKind; 2] = [ArtifactKind::Model, ArtifactKind::Report];

    /// Short name used when minting logical ids (`model:<region>`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Report => "report",
        }
    }

    /// The remote item type this artifact is published as.
    pub fn item_type(&self) -> ItemType {
        match self {
            ArtifactKind::Model => ItemType::SemanticModel,
            ArtifactKind::Report => ItemType::Report,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remote item type as reported by the workspace item listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// `SemanticModel`
    SemanticModel,
    /// `Report`
    Report,
}

impl ItemType {
    /// Wire name used in the item listing `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::SemanticModel => "SemanticModel",
            ItemType::Report => "Report",
        }
    }

    /// Collection segment used in create/update URLs.
    pub fn collection(&self) -> &'static str {
        match self {
            ItemType::SemanticModel => "semanticModels",
            ItemType::Report => "reports",
        }
    }

    /// Parse a wire type name. Returns `None` for item types this tool
    /// does not manage (lakehouses, notebooks, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SemanticModel" => Some(ItemType::SemanticModel),
            "Report" => Some(ItemType::Report),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable logical identity of an artifact, as stored in
/// `config.logicalId` of its platform file.
///
/// Kept as a string rather than a parsed UUID: ids written by other tools
/// are retained verbatim even if they are not canonical UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Wrap an existing id. Returns `None` for empty strings.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<uuid::Uuid> for LogicalId {
    fn from(id: uuid::Uuid) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for LogicalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

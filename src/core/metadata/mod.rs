//! core::metadata
//!
//! Typed views over the per-artifact metadata files.
//!
//! # Modules
//!
//! - [`platform`] - `.platform` files (display name, logical id, type)
//! - [`definition`] - Model definition text and report definition JSON
//!
//! # Design
//!
//! Every file is held as a `serde_json::Value` (or raw text) and edited in
//! place. Keys this tool does not understand, such as `$schema` or
//! `config.version`, survive a load/save cycle unchanged.
//!
//! # Example
//!
//! ```
//! use regionforge::core::metadata::PlatformFile;
//! use serde_json::json;
//!
//! let mut platform = PlatformFile::from_value(json!({
//!     "metadata": {"type": "Report", "displayName": "Template"},
//!     "config": {"version": "2.0", "logicalId": "1234"}
//! }))
//! .unwrap();
//!
//! platform.set_display_name("Sales_EMEA");
//! assert_eq!(platform.display_name(), "Sales_EMEA");
//! assert_eq!(platform.logical_id().unwrap().as_str(), "1234");
//! ```

pub mod definition;
pub mod platform;

pub use definition::{find_parameter_value, ModelDefinition, ReportDefinition};
pub use platform::PlatformFile;

use std::path::PathBuf;

use thiserror::Error;

use super::fsutil::FsError;

/// Errors from loading or editing metadata files.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("'{path}' must contain a JSON object at the top level")]
    NotAnObject { path: PathBuf },
}

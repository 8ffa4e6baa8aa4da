//! core::config
//!
//! Configuration loading: template description, region list, and publish
//! settings.
//!
//! # Overview
//!
//! Two JSON documents drive a run:
//! - **Template config** (default `config/template_report_config`): where the
//!   template model and report live and which model parameter holds the
//!   region placeholder
//! - **Regions config** (default `config/regions`): naming prefix, per-region
//!   path templates, and the list of region codes
//!
//! Publishing additionally reads an optional TOML settings file (see
//! [`schema`]).
//!
//! # Caching
//!
//! [`ConfigResolver`] owns a [`JsonCache`] for the documents it reads while
//! resolving configuration. Nothing else uses that cache: the instantiator
//! and publisher always read artifacts fresh from disk, since they also
//! write them.
//!
//! # Example
//!
//! ```no_run
//! use regionforge::core::config::ConfigResolver;
//! use std::path::Path;
//!
//! let mut resolver = ConfigResolver::new(Path::new("."));
//! let template = resolver.template_config(Path::new("config/template_report_config")).unwrap();
//! let regions = resolver.regions_config(Path::new("config/regions")).unwrap();
//!
//! println!("placeholder: {}", template.parameter_value);
//! println!("regions: {}", regions.regions.len());
//! ```

pub mod schema;

pub use schema::{PublishSettings, SettingsFile};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use super::fsutil::{self, FsError};
use super::json::{dotted, get_nested, get_nested_str};
use super::metadata::{find_parameter_value, MetadataError, PlatformFile, ReportDefinition};
use super::types::{LogicalId, RegionCode};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("missing required key '{key}' in '{path}'")]
    MissingKey { path: PathBuf, key: String },

    #[error("invalid value for '{key}' in '{path}': {message}")]
    InvalidKey {
        path: PathBuf,
        key: String,
        message: String,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("parameter '{parameter}' not found in model definition '{path}'")]
    ParameterNotFound { parameter: String, path: PathBuf },

    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("failed to parse settings file '{path}': {message}")]
    SettingsParse { path: PathBuf, message: String },
}

/// Per-run cache of parsed JSON documents, keyed by resolved path.
///
/// Only configuration inputs go through this cache. Files written during
/// the run must never be read through it.
#[derive(Debug, Default)]
pub struct JsonCache {
    entries: HashMap<PathBuf, Value>,
}

impl JsonCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, parsing it on first access only.
    pub fn load(&mut self, path: &Path) -> Result<&Value, FsError> {
        if !self.entries.contains_key(path) {
            let value = fsutil::read_json(path)?;
            self.entries.insert(path.to_path_buf(), value);
        }
        // Inserted above if it was missing.
        self.entries
            .get(path)
            .ok_or_else(|| FsError::MissingSource(path.to_path_buf()))
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Metadata read from one of the template's platform files.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMetadata {
    /// `metadata.type`
    pub item_type: String,
    /// `metadata.displayName`
    pub display_name: String,
    /// `config.logicalId`
    pub logical_id: Option<LogicalId>,
}

impl TemplateMetadata {
    fn from_platform(platform: &PlatformFile) -> Self {
        Self {
            item_type: platform.item_type().to_string(),
            display_name: platform.display_name().to_string(),
            logical_id: platform.logical_id(),
        }
    }
}

/// Immutable description of the source template.
///
/// All paths are resolved against the working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConfig {
    /// Directory under which region artifacts are created
    pub base_path: PathBuf,
    /// Template semantic model directory
    pub template_model: PathBuf,
    /// Template report directory
    pub template_report: PathBuf,
    /// Template model platform file
    pub model_platform: PathBuf,
    /// Template model definition file (holds the region parameter)
    pub model_definition: PathBuf,
    /// Template report platform file
    pub report_platform: PathBuf,
    /// Template report definition file
    pub report_definition: PathBuf,
    /// Name of the region parameter in the model definition
    pub parameter_name: String,
    /// The parameter's value in the template: the placeholder to replace
    pub parameter_value: String,
    /// Template model metadata
    pub model: TemplateMetadata,
    /// Template report metadata
    pub report: TemplateMetadata,
    /// Dataset path the template report points at
    pub report_model_reference: String,
}

impl TemplateConfig {
    /// Model definition path relative to the template model directory.
    ///
    /// Used to locate the same file inside a region's model copy.
    pub fn model_definition_relative(&self) -> Option<&Path> {
        self.model_definition
            .strip_prefix(&self.template_model)
            .ok()
    }

    /// Report definition path relative to the template report directory.
    pub fn report_definition_relative(&self) -> Option<&Path> {
        self.report_definition
            .strip_prefix(&self.template_report)
            .ok()
    }

    /// Model platform path relative to the template model directory.
    pub fn model_platform_relative(&self) -> Option<&Path> {
        self.model_platform.strip_prefix(&self.template_model).ok()
    }

    /// Report platform path relative to the template report directory.
    pub fn report_platform_relative(&self) -> Option<&Path> {
        self.report_platform
            .strip_prefix(&self.template_report)
            .ok()
    }
}

/// Path templates for region artifacts, from the regions config `paths`
/// object. `None` means "derive from the template layout".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTemplates {
    pub model_dir: Option<String>,
    pub model_platform: Option<String>,
    pub model_definition: Option<String>,
    pub report_dir: Option<String>,
    pub report_platform: Option<String>,
    pub report_definition: Option<String>,
}

/// The regions config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionsConfig {
    /// Prefix prepended to every region code in names and paths
    pub prefix: String,
    /// Path templates for region artifacts
    pub paths: PathTemplates,
    /// Region codes in config order
    pub regions: Vec<RegionCode>,
}

/// Resolves configuration documents into typed structures.
#[derive(Debug)]
pub struct ConfigResolver {
    workdir: PathBuf,
    cache: JsonCache,
}

impl ConfigResolver {
    /// Create a resolver that resolves relative paths against `workdir`.
    pub fn new(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            cache: JsonCache::new(),
        }
    }

    /// The working directory relative paths resolve against.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Resolve a possibly-relative path against the working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir.join(path)
        }
    }

    /// Load the template config and the template's own metadata.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingKey` if a required key is absent or empty
    /// - `ConfigError::Fs` / `ConfigError::Metadata` if a file cannot be read
    /// - `ConfigError::ParameterNotFound` if the model definition has no
    ///   assignment for the configured parameter
    pub fn template_config(&mut self, path: &Path) -> Result<TemplateConfig, ConfigError> {
        let config_path = self.resolve(path);
        let doc = self.cache.load(&config_path)?.clone();

        let required = |keys: &[&str]| -> Result<String, ConfigError> {
            required_str(&doc, keys, &config_path)
        };

        let base_path = self.resolve(get_nested_str(&doc, &["base_path"], "."));
        let template_model = self.resolve(required(&["model_attributes", "template_model"])?);
        let model_platform = self.resolve(required(&["model_attributes", "model_platform"])?);
        let model_definition = self.resolve(required(&["model_attributes", "model_definition"])?);
        let template_report = self.resolve(required(&["report_attributes", "template_report"])?);
        let report_platform = self.resolve(required(&["report_attributes", "report_platform"])?);
        let report_definition =
            self.resolve(required(&["report_attributes", "report_definition"])?);
        let parameter_name = required(&["parameter_name"])?;

        let model = self.platform_metadata(&model_platform)?;
        let report = self.platform_metadata(&report_platform)?;

        let report_model_reference = {
            let value = self.cache.load(&report_definition)?.clone();
            ReportDefinition::from_value(value)
                .ok_or_else(|| MetadataError::NotAnObject {
                    path: report_definition.clone(),
                })?
                .dataset_path()
                .to_string()
        };

        let definition_text = fsutil::read_text(&model_definition)?;
        let parameter_value = find_parameter_value(&definition_text, &parameter_name)
            .ok_or_else(|| ConfigError::ParameterNotFound {
                parameter: parameter_name.clone(),
                path: model_definition.clone(),
            })?;

        tracing::debug!(
            template = %template_model.display(),
            parameter = %parameter_name,
            placeholder = %parameter_value,
            "resolved template config"
        );

        Ok(TemplateConfig {
            base_path,
            template_model,
            template_report,
            model_platform,
            model_definition,
            report_platform,
            report_definition,
            parameter_name,
            parameter_value,
            model,
            report,
            report_model_reference,
        })
    }

    /// Load the regions config.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingKey` if `naming.prefix` or `regions` is absent
    /// - `ConfigError::InvalidKey` if `regions` is not a list of valid,
    ///   distinct region codes, or a path template is not a string
    pub fn regions_config(&mut self, path: &Path) -> Result<RegionsConfig, ConfigError> {
        let config_path = self.resolve(path);
        let doc = self.cache.load(&config_path)?.clone();
        parse_regions_config(&doc, &config_path)
    }

    /// Load publish settings, falling back to defaults when `path` is `None`.
    pub fn publish_settings(&self, path: Option<&Path>) -> Result<PublishSettings, ConfigError> {
        let Some(path) = path else {
            return Ok(PublishSettings::default());
        };
        let path = self.resolve(path);
        let contents = fsutil::read_text(&path)?;
        let file = SettingsFile::parse(&contents).map_err(|e| ConfigError::SettingsParse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(PublishSettings::from(file))
    }

    fn platform_metadata(&mut self, path: &Path) -> Result<TemplateMetadata, ConfigError> {
        let value = self.cache.load(path)?.clone();
        let platform = PlatformFile::from_value(value).ok_or_else(|| {
            MetadataError::NotAnObject {
                path: path.to_path_buf(),
            }
        })?;
        Ok(TemplateMetadata::from_platform(&platform))
    }
}

/// Parse a regions config document.
fn parse_regions_config(doc: &Value, path: &Path) -> Result<RegionsConfig, ConfigError> {
    let prefix = match get_nested(doc, &["naming", "prefix"]) {
        Some(Value::String(prefix)) => prefix.clone(),
        Some(_) => {
            return Err(ConfigError::InvalidKey {
                path: path.to_path_buf(),
                key: "naming.prefix".into(),
                message: "must be a string".into(),
            })
        }
        None => {
            return Err(ConfigError::MissingKey {
                path: path.to_path_buf(),
                key: "naming.prefix".into(),
            })
        }
    };

    let template = |key: &str| -> Result<Option<String>, ConfigError> {
        match get_nested(doc, &["paths", key]) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ConfigError::InvalidKey {
                path: path.to_path_buf(),
                key: format!("paths.{}", key),
                message: "must be a string".into(),
            }),
        }
    };

    let paths = PathTemplates {
        model_dir: template("expected_model_path")?,
        model_platform: template("model_platform")?,
        model_definition: template("model_definition")?,
        report_dir: template("expected_report_path")?,
        report_platform: template("expected_report_platform")?,
        report_definition: template("expected_report_definition")?,
    };

    let invalid = |message: String| ConfigError::InvalidKey {
        path: path.to_path_buf(),
        key: "regions".into(),
        message,
    };

    let entries = match doc.get("regions") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(invalid("must be a list of region codes".into())),
        None => {
            return Err(ConfigError::MissingKey {
                path: path.to_path_buf(),
                key: "regions".into(),
            })
        }
    };

    let mut regions = Vec::with_capacity(entries.len());
    let mut seen = HashSet::new();
    for entry in entries {
        let code = entry
            .as_str()
            .ok_or_else(|| invalid(format!("expected a string, found {}", entry)))?;
        let region = RegionCode::new(code).map_err(|e| invalid(e.to_string()))?;
        if !seen.insert(region.clone()) {
            // Two entries would derive the same display name and alias the
            // same remote items.
            return Err(invalid(format!("region '{}' is listed more than once", region)));
        }
        regions.push(region);
    }

    Ok(RegionsConfig {
        prefix,
        paths,
        regions,
    })
}

/// Resolve a required, non-empty string at `keys`.
fn required_str(doc: &Value, keys: &[&str], path: &Path) -> Result<String, ConfigError> {
    match get_nested_str(doc, keys, "") {
        "" => Err(ConfigError::MissingKey {
            path: path.to_path_buf(),
            key: dotted(keys),
        }),
        value => Ok(value.to_string()),
    }
}

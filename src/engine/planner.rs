//! engine::planner
//!
//! Expands the configured region list into concrete per-region plans.
//!
//! # Path templates
//!
//! Each artifact path comes from a template in the regions config `paths`
//! object:
//!
//! - A template containing `{prefix}` or `{region}` is expanded in place,
//!   e.g. `{prefix}{region}.SemanticModel`
//! - A template without placeholders is a suffix appended to
//!   `prefix + region`, e.g. `.SemanticModel`
//! - A missing template falls back to the template's own layout: the
//!   artifact directory is `{prefix}{region}.SemanticModel` (or `.Report`)
//!   and the platform and definition files sit at the same relative
//!   location as in the template
//!
//! All paths are rooted at the template's `base_path`, so region artifacts
//! end up next to the template.
//!
//! # Invariants
//!
//! - One plan per region, in config order
//! - Existence flags are sampled once, when the plan is built
//! - No two plans share a report name or an artifact directory
//! - No artifact directory overlaps a template directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::config::{ConfigError, RegionsConfig, TemplateConfig};
use crate::core::fsutil::overlaps;
use crate::core::naming::report_name;
use crate::core::types::{ArtifactKind, RegionCode};

const DEFAULT_MODEL_DIR: &str = "{prefix}{region}.SemanticModel";
const DEFAULT_REPORT_DIR: &str = "{prefix}{region}.Report";
const DEFAULT_PLATFORM_FILE: &str = ".platform";
const DEFAULT_MODEL_DEFINITION: &str = "definition/expressions.tmdl";
const DEFAULT_REPORT_DEFINITION: &str = "definition.pbir";

/// Concrete plan for one region's artifact pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPlan {
    /// Region code
    pub region: RegionCode,
    /// Display name shared by the region's model and report
    pub report_name: String,
    /// Target semantic model directory
    pub model_dir: PathBuf,
    /// Target report directory
    pub report_dir: PathBuf,
    /// Model platform file inside `model_dir`
    pub model_platform: PathBuf,
    /// Model definition file holding the region parameter
    pub model_definition: PathBuf,
    /// Report platform file inside `report_dir`
    pub report_platform: PathBuf,
    /// Report definition file
    pub report_definition: PathBuf,
    /// Whether `model_dir` existed when the plan was built
    pub model_exists: bool,
    /// Whether `report_dir` existed when the plan was built
    pub report_exists: bool,
}

impl RegionPlan {
    /// Target directory for `kind`.
    pub fn dir(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Model => &self.model_dir,
            ArtifactKind::Report => &self.report_dir,
        }
    }

    /// Platform file for `kind`.
    pub fn platform(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Model => &self.model_platform,
            ArtifactKind::Report => &self.report_platform,
        }
    }

    /// Existence flag for `kind`.
    pub fn exists(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Model => self.model_exists,
            ArtifactKind::Report => self.report_exists,
        }
    }

    /// Relative path from the report directory to the model directory,
    /// as written into the report definition.
    pub fn model_reference(&self) -> String {
        let name = self
            .model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("../{}", name)
    }
}

/// Expand a path template for one region.
///
/// # Example
///
/// ```
/// use regionforge::engine::planner::expand_template;
/// use regionforge::core::types::RegionCode;
///
/// let emea = RegionCode::new("EMEA").unwrap();
/// assert_eq!(expand_template(".Report", "Sales_", &emea), "Sales_EMEA.Report");
/// assert_eq!(
///     expand_template("out/{region}/{prefix}.Report", "Sales_", &emea),
///     "out/EMEA/Sales_.Report"
/// );
/// ```
pub fn expand_template(template: &str, prefix: &str, region: &RegionCode) -> String {
    if template.contains("{prefix}") || template.contains("{region}") {
        template
            .replace("{prefix}", prefix)
            .replace("{region}", region.as_str())
    } else {
        format!("{}{}{}", prefix, region, template)
    }
}

/// Build one plan per configured region, in config order.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if two regions would share a report
/// name or an artifact directory, or if a region's directory overlaps the
/// template's model or report directory.
pub fn plan_regions(
    template: &TemplateConfig,
    regions: &RegionsConfig,
) -> Result<Vec<RegionPlan>, ConfigError> {
    let mut names: HashMap<String, &RegionCode> = HashMap::new();
    let mut dirs: HashMap<PathBuf, &RegionCode> = HashMap::new();
    let mut plans = Vec::with_capacity(regions.regions.len());

    for region in &regions.regions {
        let plan = plan_region(template, regions, region);

        if let Some(other) = names.insert(plan.report_name.clone(), region) {
            return Err(ConfigError::InvalidValue(format!(
                "regions '{}' and '{}' both derive report name '{}'",
                other, region, plan.report_name
            )));
        }
        for dir in [&plan.model_dir, &plan.report_dir] {
            for source in [&template.template_model, &template.template_report] {
                if overlaps(dir, source) {
                    return Err(ConfigError::InvalidValue(format!(
                        "region '{}' maps to '{}', which overlaps template directory '{}'",
                        region,
                        dir.display(),
                        source.display()
                    )));
                }
            }
            if let Some(other) = dirs.insert(dir.clone(), region) {
                return Err(ConfigError::InvalidValue(format!(
                    "regions '{}' and '{}' both map to '{}'",
                    other,
                    region,
                    dir.display()
                )));
            }
        }

        tracing::debug!(
            region = %plan.region,
            model_exists = plan.model_exists,
            report_exists = plan.report_exists,
            "planned region"
        );
        plans.push(plan);
    }

    Ok(plans)
}

fn plan_region(template: &TemplateConfig, regions: &RegionsConfig, region: &RegionCode) -> RegionPlan {
    let prefix = regions.prefix.as_str();
    let paths = &regions.paths;
    let root = &template.base_path;
    let expand = |t: &str| root.join(expand_template(t, prefix, region));

    let model_dir = expand(paths.model_dir.as_deref().unwrap_or(DEFAULT_MODEL_DIR));
    let report_dir = expand(paths.report_dir.as_deref().unwrap_or(DEFAULT_REPORT_DIR));

    let inside = |explicit: &Option<String>, dir: &Path, relative: Option<&Path>, fallback: &str| {
        match explicit {
            Some(t) => expand(t),
            None => within(dir, relative, fallback),
        }
    };

    let model_platform = inside(
        &paths.model_platform,
        &model_dir,
        template.model_platform_relative(),
        DEFAULT_PLATFORM_FILE,
    );
    let model_definition = inside(
        &paths.model_definition,
        &model_dir,
        template.model_definition_relative(),
        DEFAULT_MODEL_DEFINITION,
    );
    let report_platform = inside(
        &paths.report_platform,
        &report_dir,
        template.report_platform_relative(),
        DEFAULT_PLATFORM_FILE,
    );
    let report_definition = inside(
        &paths.report_definition,
        &report_dir,
        template.report_definition_relative(),
        DEFAULT_REPORT_DEFINITION,
    );

    RegionPlan {
        region: region.clone(),
        report_name: report_name(prefix, region),
        model_exists: model_dir.exists(),
        report_exists: report_dir.exists(),
        model_dir,
        report_dir,
        model_platform,
        model_definition,
        report_platform,
        report_definition,
    }
}

/// Join the template-relative location of a file onto a region directory.
fn within(dir: &Path, relative: Option<&Path>, fallback: &str) -> PathBuf {
    match relative {
        Some(relative) => dir.join(relative),
        None => dir.join(fallback),
    }
}

//! engine::instantiate
//!
//! Materializes a region's model and report from the template.
//!
//! # Algorithm
//!
//! For each artifact, model first:
//!
//! 1. If the plan says the artifact existed, read its current logical id
//! 2. Merge-copy the template directory onto the target directory
//! 3. Apply the artifact's [`SubstitutionRule`]s to the copied files
//! 4. Write the edited files back
//!
//! The model goes first because the report's dataset reference points at
//! the model's directory.
//!
//! # Identity
//!
//! A logical id, once written for a (kind, region) pair, is retained on
//! every later run. Artifacts with no prior id get a deterministic one from
//! [`mint_logical_id`].
//!
//! # Failure
//!
//! The first error stops the run. Files already written stay on disk;
//! a later run converges them.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::planner::RegionPlan;
use crate::core::config::{ConfigError, TemplateConfig};
use crate::core::fsutil::{self, FsError};
use crate::core::metadata::platform::read_existing_logical_id;
use crate::core::metadata::{MetadataError, ModelDefinition, PlatformFile, ReportDefinition};
use crate::core::naming::mint_logical_id;
use crate::core::types::{ArtifactKind, LogicalId, RegionCode};

/// Errors from template instantiation.
#[derive(Debug, Error)]
pub enum InstantiateError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("rule {rule} does not apply to a {kind} artifact")]
    RuleNotApplicable { rule: &'static str, kind: ArtifactKind },
}

/// One edit applied to an instantiated artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionRule {
    /// Set `config.displayName` and `metadata.displayName`
    DisplayName(String),
    /// Set `config.logicalId`
    LogicalId(LogicalId),
    /// Replace the template placeholder in the model definition
    Parameter {
        placeholder: String,
        value: String,
        /// Whether a missing placeholder is an error
        required: bool,
    },
    /// Point the report definition at a model directory
    DatasetPath(String),
}

impl SubstitutionRule {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SubstitutionRule::DisplayName(_) => "display-name",
            SubstitutionRule::LogicalId(_) => "logical-id",
            SubstitutionRule::Parameter { .. } => "parameter",
            SubstitutionRule::DatasetPath(_) => "dataset-path",
        }
    }
}

/// A definition file, typed by artifact kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Model(ModelDefinition),
    Report(ReportDefinition),
}

/// The editable files of one instantiated artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDocument {
    pub kind: ArtifactKind,
    pub platform_path: PathBuf,
    pub platform: PlatformFile,
    pub definition_path: PathBuf,
    pub definition: Definition,
}

impl ArtifactDocument {
    /// Load the platform and definition files of a planned artifact.
    pub fn load(plan: &RegionPlan, kind: ArtifactKind) -> Result<Self, MetadataError> {
        let platform_path = plan.platform(kind).to_path_buf();
        let platform = PlatformFile::load(&platform_path)?;
        let (definition_path, definition) = match kind {
            ArtifactKind::Model => (
                plan.model_definition.clone(),
                Definition::Model(ModelDefinition::load(&plan.model_definition)?),
            ),
            ArtifactKind::Report => (
                plan.report_definition.clone(),
                Definition::Report(ReportDefinition::load(&plan.report_definition)?),
            ),
        };
        Ok(Self {
            kind,
            platform_path,
            platform,
            definition_path,
            definition,
        })
    }

    /// Write both files back to where they were loaded from.
    pub fn save(&self) -> Result<(), MetadataError> {
        self.platform.save(&self.platform_path)?;
        match &self.definition {
            Definition::Model(model) => model.save(&self.definition_path),
            Definition::Report(report) => report.save(&self.definition_path),
        }
    }
}

/// Apply one rule to a loaded artifact.
///
/// Returns the number of edits made. Only the parameter rule can make
/// zero or several edits.
///
/// # Errors
///
/// - `ConfigError::ParameterNotFound` if a required placeholder is absent
/// - `InstantiateError::RuleNotApplicable` for a model rule on a report,
///   or the reverse
pub fn apply_rule(
    rule: &SubstitutionRule,
    doc: &mut ArtifactDocument,
) -> Result<usize, InstantiateError> {
    match (rule, &mut doc.definition) {
        (SubstitutionRule::DisplayName(name), _) => {
            doc.platform.set_display_name(name);
            Ok(1)
        }
        (SubstitutionRule::LogicalId(id), _) => {
            doc.platform.set_logical_id(id);
            Ok(1)
        }
        (
            SubstitutionRule::Parameter {
                placeholder,
                value,
                required,
            },
            Definition::Model(model),
        ) => {
            let replaced = model.replace_placeholder(placeholder, value);
            if replaced == 0 {
                if *required {
                    return Err(ConfigError::ParameterNotFound {
                        parameter: placeholder.clone(),
                        path: doc.definition_path.clone(),
                    }
                    .into());
                }
                tracing::warn!(
                    placeholder = %placeholder,
                    path = %doc.definition_path.display(),
                    "placeholder not present, leaving definition unchanged"
                );
            }
            Ok(replaced)
        }
        (SubstitutionRule::DatasetPath(path), Definition::Report(report)) => {
            report.set_dataset_path(path);
            Ok(1)
        }
        (rule, _) => Err(InstantiateError::RuleNotApplicable {
            rule: rule.name(),
            kind: doc.kind,
        }),
    }
}

/// The rules that turn a fresh template copy into a region artifact.
pub fn substitution_rules(
    template: &TemplateConfig,
    plan: &RegionPlan,
    kind: ArtifactKind,
    logical_id: LogicalId,
) -> Vec<SubstitutionRule> {
    let mut rules = vec![
        SubstitutionRule::DisplayName(plan.report_name.clone()),
        SubstitutionRule::LogicalId(logical_id),
    ];
    match kind {
        ArtifactKind::Model => rules.push(SubstitutionRule::Parameter {
            placeholder: template.parameter_value.clone(),
            value: plan.region.as_str().to_string(),
            required: !plan.model_exists,
        }),
        ArtifactKind::Report => rules.push(SubstitutionRule::DatasetPath(plan.model_reference())),
    }
    rules
}

/// Where an artifact's logical id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Read back from the artifact's existing platform file
    Retained,
    /// Minted for an artifact with no prior identity
    Minted,
}

impl IdentitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentitySource::Retained => "retained",
            IdentitySource::Minted => "minted",
        }
    }
}

/// Result of instantiating one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub kind: ArtifactKind,
    pub dir: PathBuf,
    pub logical_id: LogicalId,
    pub identity: IdentitySource,
    pub files_copied: usize,
    /// Region placeholder that matched nothing on a re-run
    pub unmatched_placeholder: Option<String>,
}

/// Result of instantiating one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiationReport {
    pub region: RegionCode,
    pub report_name: String,
    pub model: ArtifactOutcome,
    pub report: ArtifactOutcome,
}

/// Produce or refresh the model and report for one plan.
pub fn instantiate(
    template: &TemplateConfig,
    plan: &RegionPlan,
) -> Result<InstantiationReport, InstantiateError> {
    let model = instantiate_artifact(template, plan, ArtifactKind::Model)?;
    let report = instantiate_artifact(template, plan, ArtifactKind::Report)?;
    Ok(InstantiationReport {
        region: plan.region.clone(),
        report_name: plan.report_name.clone(),
        model,
        report,
    })
}

/// Instantiate every plan in order, stopping at the first error.
pub fn instantiate_all(
    template: &TemplateConfig,
    plans: &[RegionPlan],
) -> Result<Vec<InstantiationReport>, InstantiateError> {
    plans.iter().map(|plan| instantiate(template, plan)).collect()
}

fn template_dir(template: &TemplateConfig, kind: ArtifactKind) -> &Path {
    match kind {
        ArtifactKind::Model => &template.template_model,
        ArtifactKind::Report => &template.template_report,
    }
}

fn instantiate_artifact(
    template: &TemplateConfig,
    plan: &RegionPlan,
    kind: ArtifactKind,
) -> Result<ArtifactOutcome, InstantiateError> {
    // Must be read before the copy overwrites the platform file.
    let prior = if plan.exists(kind) {
        read_existing_logical_id(plan.platform(kind))?
    } else {
        None
    };

    let files_copied = fsutil::copy_tree(template_dir(template, kind), plan.dir(kind))?;

    let (logical_id, identity) = match prior {
        Some(id) => (id, IdentitySource::Retained),
        None => (mint_logical_id(kind, &plan.region), IdentitySource::Minted),
    };

    let mut doc = ArtifactDocument::load(plan, kind)?;
    let mut unmatched_placeholder = None;
    for rule in substitution_rules(template, plan, kind, logical_id.clone()) {
        let replaced = apply_rule(&rule, &mut doc)?;
        if let (0, SubstitutionRule::Parameter { placeholder, .. }) = (replaced, &rule) {
            unmatched_placeholder = Some(placeholder.clone());
        }
    }
    doc.save()?;

    tracing::info!(
        region = %plan.region,
        kind = %kind,
        logical_id = %logical_id,
        retained = identity == IdentitySource::Retained,
        "instantiated artifact"
    );

    Ok(ArtifactOutcome {
        kind,
        dir: plan.dir(kind).to_path_buf(),
        logical_id,
        identity,
        files_copied,
        unmatched_placeholder,
    })
}

//! engine
//!
//! Local generation: planning regions and instantiating the template.
//!
//! # Lifecycle
//!
//! ```text
//! TemplateConfig + RegionsConfig -> plan_regions -> [RegionPlan] -> instantiate_all
//! ```
//!
//! Planning only reads the filesystem (existence checks). Instantiation
//! writes each region's artifacts, one region at a time, model before
//! report.
//!
//! # Example
//!
//! ```no_run
//! use regionforge::core::config::ConfigResolver;
//! use regionforge::engine::{instantiate_all, plan_regions};
//! use std::path::Path;
//!
//! let mut resolver = ConfigResolver::new(Path::new("."));
//! let template = resolver.template_config(Path::new("config/template_report_config")).unwrap();
//! let regions = resolver.regions_config(Path::new("config/regions")).unwrap();
//!
//! let plans = plan_regions(&template, &regions).unwrap();
//! for report in instantiate_all(&template, &plans).unwrap() {
//!     println!("{} -> {}", report.region, report.model.logical_id);
//! }
//! ```

pub mod instantiate;
pub mod planner;

use std::path::PathBuf;

pub use instantiate::{
    apply_rule, instantiate, instantiate_all, substitution_rules, ArtifactOutcome,
    IdentitySource, InstantiateError, InstantiationReport, SubstitutionRule,
};
pub use planner::{plan_regions, RegionPlan};

/// Default template config path, relative to the working directory.
pub const DEFAULT_TEMPLATE_CONFIG: &str = "config/template_report_config";

/// Default regions config path, relative to the working directory.
pub const DEFAULT_REGIONS_CONFIG: &str = "config/regions";

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Template config path.
    pub template_config: PathBuf,
    /// Regions config path.
    pub regions_config: PathBuf,
}

impl Context {
    /// The directory relative config paths resolve against.
    pub fn workdir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            template_config: PathBuf::from(DEFAULT_TEMPLATE_CONFIG),
            regions_config: PathBuf::from(DEFAULT_REGIONS_CONFIG),
        }
    }
}

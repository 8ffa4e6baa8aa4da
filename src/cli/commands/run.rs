//! run command - Generate, then publish

use std::path::Path;

use anyhow::Result;

use super::generate::generate_loaded;
use super::publish::publish_loaded;
use super::{load, verbosity};
use crate::engine::Context;

/// Generate every region, then publish them with the same plans.
pub fn run(ctx: &Context, settings: Option<&Path>) -> Result<()> {
    let loaded = load(ctx)?;
    let verbosity = verbosity(ctx);
    generate_loaded(&loaded, verbosity)?;
    publish_loaded(&loaded, settings, verbosity)
}

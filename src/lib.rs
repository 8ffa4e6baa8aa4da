//! regionforge - fan a report template out across regions and publish it
//!
//! A single report template (a semantic model plus a report bound to it) is
//! copied into one model/report pair per configured region. Each copy gets
//! its own display name, region parameter and stable logical id. The
//! results can then be published to a remote workspace.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`core`] - Domain types, configuration, metadata files, filesystem helpers
//! - [`engine`] - Region planning and template instantiation
//! - [`publish`] - Create-or-update publishing with operation polling
//! - [`workspace`] - Remote item store abstraction (HTTP and mock)
//! - [`auth`] - Client-credentials token provider
//! - [`secrets`] - Secret source abstraction
//! - [`ui`] - Operator output
//!
//! # Invariants
//!
//! 1. A region's logical ids never change once written
//! 2. Minted logical ids depend only on artifact kind and region code
//! 3. The model is always processed before the report that references it
//! 4. Definition submissions are never retried blindly

pub mod auth;
pub mod cli;
pub mod core;
pub mod engine;
pub mod publish;
pub mod secrets;
pub mod ui;
pub mod workspace;

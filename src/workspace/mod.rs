//! workspace
//!
//! Abstraction over the remote workspace that holds published items.
//!
//! # Architecture
//!
//! The `Workspace` trait defines the three calls publishing relies on:
//! listing items, submitting a definition, and polling a long-running
//! operation. The publisher depends only on the trait, so tests substitute
//! [`mock::MockWorkspace`] for the HTTP client.
//!
//! # Modules
//!
//! - `traits`: Core `Workspace` trait and request/response types
//! - [`fabric`]: Fabric REST implementation
//! - [`mock`]: Mock implementation for deterministic testing

pub mod fabric;
pub mod mock;
mod traits;

pub use fabric::FabricWorkspace;
pub use traits::*;

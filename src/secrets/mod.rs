//! secrets
//!
//! Secret lookup abstraction for publish credentials.
//!
//! # Architecture
//!
//! Credentials are read through the [`SecretSource`] trait:
//!
//! - [`EnvSource`]: process environment (used by the CLI)
//! - [`MemorySource`]: in-memory map (tests, embedding)
//!
//! # Security
//!
//! Secret values are never logged or included in error messages. Types
//! holding secrets implement `Debug` by hand to redact them.

mod env_source;
mod memory_source;
mod traits;

pub use env_source::EnvSource;
pub use memory_source::MemorySource;
pub use traits::{SecretError, SecretSource};

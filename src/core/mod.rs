//! core
//!
//! Core domain types, file formats, and configuration for regionforge.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RegionCode, LogicalId, ArtifactKind, ItemType
//! - [`naming`] - Display-name derivation and logical-id minting
//! - [`json`] - Nested lookups over loosely-typed JSON
//! - [`fsutil`] - File reads/writes and merge-copy of artifact trees
//! - [`metadata`] - Platform files and model/report definitions
//! - [`config`] - Template, regions, and publish settings
//!
//! # Design Principles
//!
//! - Strong typing keeps invalid region codes out of paths and names
//! - Artifact files are edited in place; unknown keys survive rewrites
//! - Identity derivation is deterministic

pub mod config;
pub mod fsutil;
pub mod json;
pub mod metadata;
pub mod naming;
pub mod types;

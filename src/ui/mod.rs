//! ui
//!
//! Operator output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing and formatting
//!
//! # Design
//!
//! All operator-facing text goes through this module so that `--quiet` and
//! `--debug` behave the same in every command.

pub mod output;

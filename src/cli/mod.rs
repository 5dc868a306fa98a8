// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! console logging and the `annotate` command implementation.

// Modules
/// `annotate` command.
#[cfg(feature = "annotate")]
pub mod annotate;

/// CLI arguments.
pub mod args;

/// Console logging macros.
pub mod logging;

//! # stackprep
//!
//! Drives the preprocessing of microscopy image stacks: flat-field
//! estimation, binary mask generation and tiling into fixed-size patches,
//! followed by a provenance record of everything the run produced.
//!
//! ## Usage
//!
//! ```bash
//! stackprep --config preprocess.yml [-v] [--dry-run]
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging setup and fatal error reporting for the binary
//! - `cli` - Command-line arguments and routing
//! - `config` - Typed, validated preprocessing configuration
//! - `error` - Error type with categorized codes
//! - `layout` - Derived output directory names
//! - `pipeline` - Load, run and record in one call
//! - `provenance` - The `preprocessing_info.json` record
//! - `stages` - Stage planning, execution and the collaborator seam
//! - `subprocess` - Process execution used by external collaborators
//! - `testing` - Recording collaborators for tests
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod provenance;
pub mod stages;
pub mod subprocess;

pub mod testing;

pub use error::{PreprocessError, Result};

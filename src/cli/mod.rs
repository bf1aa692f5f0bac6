//! CLI handling
//!
//! - Argument parsing structures
//! - Command routing

pub mod args;
pub mod router;

pub use args::Cli;
pub use router::execute_command;

//! CLI argument structures

use clap::Parser;
use std::path::PathBuf;

/// Preprocess microscopy image stacks for training
#[derive(Parser, Debug)]
#[command(name = "stackprep")]
#[command(
    about = "stackprep - Flat-field correction, mask generation and tiling of image stacks",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Path to the YAML preprocessing configuration
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Validate the configuration and print the stage plan without running it
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from(["stackprep", "-c", "pre.yml", "-vv", "--dry-run"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("pre.yml"));
        assert_eq!(cli.verbose, 2);
        assert!(cli.dry_run);
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["stackprep"]).is_err());
    }
}

//! Command execution
//!
//! Routes parsed arguments to either a dry-run plan or a full pipeline run.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::args::Cli;
use crate::pipeline;
use crate::subprocess::SubprocessManager;

/// Execute the command described by the parsed arguments
pub async fn execute_command(cli: &Cli) -> Result<()> {
    if cli.dry_run {
        let plan = pipeline::plan_from_file(&cli.config).await?;
        let json = serde_json::to_string_pretty(&plan).context("failed to render stage plan")?;
        println!("{json}");
        return Ok(());
    }

    let record = pipeline::run_from_file(&cli.config, SubprocessManager::production()).await?;
    info!(
        "Preprocessing complete; outputs recorded under {}",
        record.output_dir.display()
    );
    Ok(())
}

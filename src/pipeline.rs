//! End-to-end preprocessing run
//!
//! Loads the configuration, runs the enabled stages and writes the
//! processing record, in that order.

use std::path::Path;
use tracing::{debug, info};

use crate::config::{ConfigLoader, LoadedConfig};
use crate::error::Result;
use crate::provenance::{ProcessingRecord, ProvenanceWriter};
use crate::stages::{Collaborators, StagePlan, StageRunner};
use crate::subprocess::SubprocessManager;

pub struct Pipeline {
    collaborators: Collaborators,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Run every enabled stage and persist the record
    pub async fn run(&self, loaded: &LoadedConfig) -> Result<ProcessingRecord> {
        let plan = StagePlan::from_config(&loaded.config)?;
        info!(
            "Preprocessing {} into {} (stages: {:?}, config: {})",
            loaded.config.input_dir.display(),
            loaded.config.output_dir.display(),
            plan.stages(),
            loaded.source.display()
        );

        let outputs = StageRunner::new(self.collaborators.clone())
            .run(&plan)
            .await?;
        debug!("Stage outputs: {:?}", outputs);

        let record = ProcessingRecord::new(loaded, outputs);
        ProvenanceWriter::write(&record).await?;
        Ok(record)
    }
}

/// Load a configuration file and run it with external collaborators
pub async fn run_from_file(
    config_path: &Path,
    subprocess: SubprocessManager,
) -> Result<ProcessingRecord> {
    let loaded = ConfigLoader::load(config_path).await?;
    let collaborators = Collaborators::external(&loaded.config.collaborators, subprocess);
    Pipeline::new(collaborators).run(&loaded).await
}

/// Load a configuration file and compute its plan without running anything
pub async fn plan_from_file(config_path: &Path) -> Result<StagePlan> {
    let loaded = ConfigLoader::load(config_path).await?;
    StagePlan::from_config(&loaded.config)
}

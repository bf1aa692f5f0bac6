use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use super::plan::{MaskStage, StagePlan, TilingMode, TilingStage};
use super::{Collaborators, FlatFieldRequest, Stage};
use crate::error::{PreprocessError, Result};
use crate::layout::DirectoryPlanner;

/// Directories produced by the stages that actually ran
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutputs {
    pub flat_field_dir: Option<PathBuf>,
    pub mask_dir: Option<PathBuf>,
    pub tile_dir: Option<PathBuf>,
    pub tile_mask_dir: Option<PathBuf>,
}

/// Runs the planned stages in order: flat-field, masks, tiling
///
/// The first failure aborts the run. Directories created for earlier
/// stages are left on disk.
pub struct StageRunner {
    collaborators: Collaborators,
}

impl StageRunner {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    pub async fn run(&self, plan: &StagePlan) -> Result<StageOutputs> {
        let mut outputs = StageOutputs::default();

        match &plan.flat_field {
            Some(request) => {
                self.run_flat_field(plan, request).await?;
                outputs.flat_field_dir = Some(request.flat_field_dir.clone());
            }
            None => info!("Skipping flat-field correction (correct_flat_field is false)"),
        }

        match &plan.masks {
            Some(stage) => {
                self.run_masks(plan, stage).await?;
                outputs.mask_dir = Some(stage.request.output_dir.clone());
            }
            None => info!("Skipping mask generation (use_masks is false)"),
        }

        match &plan.tiling {
            Some(stage) => {
                self.run_tiling(plan, stage).await?;
                outputs.tile_dir = Some(stage.request.output_dir.clone());
                outputs.tile_mask_dir = plan.tile_mask_dir().map(PathBuf::from);
            }
            None => info!("Skipping tiling (tile_stack is false)"),
        }

        Ok(outputs)
    }

    async fn run_flat_field(&self, plan: &StagePlan, request: &FlatFieldRequest) -> Result<()> {
        let started = Self::begin(plan, Stage::FlatField).await?;
        self.collaborators
            .flat_field
            .estimate(request)
            .await
            .map_err(|e| attach_stage(e, Stage::FlatField))?;
        Self::finish(Stage::FlatField, started);
        Ok(())
    }

    async fn run_masks(&self, plan: &StagePlan, stage: &MaskStage) -> Result<()> {
        let started = Self::begin(plan, Stage::Masks).await?;
        debug!(
            "Generating masks for channels {:?} (time_ids={}, slice_ids={}, str_elem_radius={}, correct_flat_field={})",
            stage.request.channel_ids,
            stage.request.time_ids,
            stage.request.slice_ids,
            stage.options.str_elem_radius,
            stage.options.correct_flat_field
        );
        self.collaborators
            .masks
            .generate_masks(&stage.request, &stage.options)
            .await
            .map_err(|e| attach_stage(e, Stage::Masks))?;
        Self::finish(Stage::Masks, started);
        Ok(())
    }

    async fn run_tiling(&self, plan: &StagePlan, stage: &TilingStage) -> Result<()> {
        let started = Self::begin(plan, Stage::Tiling).await?;
        let tiler = &self.collaborators.tiler;
        let result = match &stage.mode {
            TilingMode::Unconstrained => {
                debug!("Tiling full stack without foreground filtering");
                tiler.tile(&stage.request).await
            }
            TilingMode::Masked(options) => {
                debug!(
                    "Tiling with min_fraction={} using masks in {}",
                    options.min_fraction,
                    options.mask_dir.display()
                );
                tiler.tile_with_mask(&stage.request, options).await
            }
        };
        result.map_err(|e| attach_stage(e, Stage::Tiling))?;
        Self::finish(Stage::Tiling, started);
        Ok(())
    }

    async fn begin(plan: &StagePlan, stage: Stage) -> Result<Instant> {
        info!("Starting stage: {}", stage);
        for dir in plan.directories_for(stage) {
            DirectoryPlanner::ensure_dir(&dir).await?;
            debug!("Prepared {} directory {}", stage, dir.display());
        }
        Ok(Instant::now())
    }

    fn finish(stage: Stage, started: Instant) {
        info!("Finished stage {} in {:?}", stage, started.elapsed());
    }
}

fn attach_stage(error: PreprocessError, stage: Stage) -> PreprocessError {
    match error {
        PreprocessError::Execution { stage: None, .. } => error.with_stage(stage.as_str()),
        PreprocessError::Execution { .. } => error,
        other => other.with_context(format!("during {} stage", stage)),
    }
}

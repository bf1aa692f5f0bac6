use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{PreprocessError, Result};
use crate::stages::{
    Collaborators, FlatFieldEstimator, FlatFieldRequest, MaskOptions, MaskProcessor, MaskRequest,
    MaskedTileOptions, Stage, StackTiler, TileRequest,
};

/// A single call received by [`RecordingCollaborators`]
#[derive(Debug, Clone, PartialEq)]
pub enum CollaboratorCall {
    Estimate(FlatFieldRequest),
    GenerateMasks(MaskRequest, MaskOptions),
    Tile(TileRequest),
    TileWithMask(TileRequest, MaskedTileOptions),
}

impl CollaboratorCall {
    pub fn stage(&self) -> Stage {
        match self {
            CollaboratorCall::Estimate(_) => Stage::FlatField,
            CollaboratorCall::GenerateMasks(..) => Stage::Masks,
            CollaboratorCall::Tile(_) | CollaboratorCall::TileWithMask(..) => Stage::Tiling,
        }
    }
}

/// Collaborators that record every call and succeed, unless told to fail
///
/// Each call also checks that the directory it is asked to write into
/// already exists, mirroring what a real collaborator relies on.
#[derive(Clone, Default)]
pub struct RecordingCollaborators {
    calls: Arc<Mutex<Vec<CollaboratorCall>>>,
    fail_stage: Arc<Mutex<Option<Stage>>>,
}

impl RecordingCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call for `stage` fail with an execution error
    pub fn fail_on(self, stage: Stage) -> Self {
        *self.fail_stage.lock().unwrap() = Some(stage);
        self
    }

    pub fn calls(&self) -> Vec<CollaboratorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stages_called(&self) -> Vec<Stage> {
        self.calls().iter().map(CollaboratorCall::stage).collect()
    }

    /// Bundle this recorder as the collaborators of a pipeline run
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    fn record(&self, call: CollaboratorCall, writes_into: &[&Path]) -> Result<()> {
        let stage = call.stage();
        self.calls.lock().unwrap().push(call);

        if *self.fail_stage.lock().unwrap() == Some(stage) {
            return Err(PreprocessError::execution("simulated collaborator failure"));
        }

        for dir in writes_into {
            if !dir.is_dir() {
                return Err(PreprocessError::execution(format!(
                    "output directory {} does not exist",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FlatFieldEstimator for RecordingCollaborators {
    async fn estimate(&self, request: &FlatFieldRequest) -> Result<()> {
        self.record(
            CollaboratorCall::Estimate(request.clone()),
            &[&request.flat_field_dir],
        )
    }
}

#[async_trait]
impl MaskProcessor for RecordingCollaborators {
    async fn generate_masks(&self, request: &MaskRequest, options: &MaskOptions) -> Result<()> {
        self.record(
            CollaboratorCall::GenerateMasks(request.clone(), *options),
            &[&request.output_dir],
        )
    }
}

#[async_trait]
impl StackTiler for RecordingCollaborators {
    async fn tile(&self, request: &TileRequest) -> Result<()> {
        self.record(
            CollaboratorCall::Tile(request.clone()),
            &[&request.output_dir],
        )
    }

    async fn tile_with_mask(
        &self,
        request: &TileRequest,
        options: &MaskedTileOptions,
    ) -> Result<()> {
        let mut dirs = vec![request.output_dir.as_path()];
        if let Some(tile_mask_dir) = &options.tile_mask_dir {
            dirs.push(tile_mask_dir.as_path());
        }
        self.record(
            CollaboratorCall::TileWithMask(request.clone(), options.clone()),
            &dirs,
        )
    }
}

//! Preprocessing stages and the collaborators that perform them
//!
//! The numerical work (flat-field estimation, mask morphology, tiling)
//! lives outside this crate. Each collaborator is reached through a trait
//! so the orchestration can be exercised against recording fakes, and
//! [`external`] provides the production implementation that runs one
//! external command per operation.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::IdSelection;
use crate::error::Result;

pub mod external;
pub mod plan;
pub mod runner;


pub use plan::{StagePlan, TilingMode};
pub use runner::{StageOutputs, StageRunner};

/// The three pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FlatField,
    Masks,
    Tiling,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FlatField => "flat_field",
            Stage::Masks => "masks",
            Stage::Tiling => "tiling",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs for flat-field estimation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatFieldRequest {
    pub input_dir: PathBuf,
    pub flat_field_dir: PathBuf,
    pub slice_ids: IdSelection,
}

/// Inputs for mask generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskRequest {
    pub input_dir: PathBuf,
    /// The mask directory the collaborator writes into
    pub output_dir: PathBuf,
    pub channel_ids: Vec<u32>,
    /// `None` when flat-field correction did not run
    pub flat_field_dir: Option<PathBuf>,
    pub time_ids: IdSelection,
    pub slice_ids: IdSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaskOptions {
    /// Flat-field correct images before thresholding
    pub correct_flat_field: bool,
    pub str_elem_radius: u32,
}

/// Inputs for tiling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileRequest {
    pub input_dir: PathBuf,
    /// The tile directory the collaborator writes into
    pub output_dir: PathBuf,
    pub tile_size: Vec<u32>,
    pub step_size: Vec<u32>,
    pub time_ids: IdSelection,
    pub channel_ids: IdSelection,
    pub slice_ids: IdSelection,
    pub hist_clip_limits: Option<[f64; 2]>,
    pub flat_field_dir: Option<PathBuf>,
    pub isotropic: bool,
}

/// Options for tiling filtered by mask foreground
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskedTileOptions {
    pub min_fraction: f64,
    pub mask_dir: PathBuf,
    /// Where cropped mask tiles are saved, if requested
    pub tile_mask_dir: Option<PathBuf>,
}

#[async_trait]
pub trait FlatFieldEstimator: Send + Sync {
    /// Estimate flat-field images into `request.flat_field_dir`
    async fn estimate(&self, request: &FlatFieldRequest) -> Result<()>;
}

#[async_trait]
pub trait MaskProcessor: Send + Sync {
    /// Generate binary masks into `request.output_dir`
    async fn generate_masks(&self, request: &MaskRequest, options: &MaskOptions) -> Result<()>;
}

#[async_trait]
pub trait StackTiler: Send + Sync {
    /// Tile the full stack without any foreground constraint
    async fn tile(&self, request: &TileRequest) -> Result<()>;

    /// Tile the stack, keeping only tiles with enough mask foreground
    async fn tile_with_mask(&self, request: &TileRequest, options: &MaskedTileOptions)
        -> Result<()>;
}

/// The set of collaborators a pipeline run uses
#[derive(Clone)]
pub struct Collaborators {
    pub flat_field: Arc<dyn FlatFieldEstimator>,
    pub masks: Arc<dyn MaskProcessor>,
    pub tiler: Arc<dyn StackTiler>,
}

impl Collaborators {
    pub fn new(
        flat_field: Arc<dyn FlatFieldEstimator>,
        masks: Arc<dyn MaskProcessor>,
        tiler: Arc<dyn StackTiler>,
    ) -> Self {
        Self {
            flat_field,
            masks,
            tiler,
        }
    }
}

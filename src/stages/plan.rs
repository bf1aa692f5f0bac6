use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{
    FlatFieldRequest, MaskOptions, MaskRequest, MaskedTileOptions, Stage, TileRequest,
};
use crate::config::PreprocessConfig;
use crate::error::{ErrorCode, PreprocessError, Result};
use crate::layout::DirectoryPlanner;

/// Which stages run and with exactly which arguments
///
/// Built without touching the filesystem; the runner executes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagePlan {
    pub flat_field: Option<FlatFieldRequest>,
    pub masks: Option<MaskStage>,
    pub tiling: Option<TilingStage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskStage {
    pub request: MaskRequest,
    pub options: MaskOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TilingStage {
    pub request: TileRequest,
    pub mode: TilingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TilingMode {
    Unconstrained,
    Masked(MaskedTileOptions),
}

impl StagePlan {
    pub fn from_config(config: &PreprocessConfig) -> Result<Self> {
        let output_dir = config.output_dir.as_path();

        let flat_field = config.correct_flat_field.then(|| FlatFieldRequest {
            input_dir: config.input_dir.clone(),
            flat_field_dir: DirectoryPlanner::flat_field_dir(output_dir),
            slice_ids: config.slice_ids.clone(),
        });
        let flat_field_dir = flat_field.as_ref().map(|ff| ff.flat_field_dir.clone());

        let masks = if config.use_masks {
            let settings = config.masks.as_ref().ok_or_else(|| missing("masks"))?;
            if settings.channels.is_empty() {
                return Err(missing("masks.channels"));
            }
            Some(MaskStage {
                request: MaskRequest {
                    input_dir: config.input_dir.clone(),
                    output_dir: DirectoryPlanner::mask_dir(output_dir, &settings.channels),
                    channel_ids: settings.channels.clone(),
                    flat_field_dir: flat_field_dir.clone(),
                    time_ids: config.time_ids.clone(),
                    slice_ids: config.slice_ids.clone(),
                },
                options: MaskOptions {
                    correct_flat_field: config.correct_flat_field,
                    str_elem_radius: settings.str_elem_radius,
                },
            })
        } else {
            None
        };

        let tiling = if config.tile_stack {
            let settings = config.tile.as_ref().ok_or_else(|| missing("tile"))?;
            if settings.tile_size.is_empty() {
                return Err(missing("tile.tile_size"));
            }
            if settings.step_size.is_empty() {
                return Err(missing("tile.step_size"));
            }

            let request = TileRequest {
                input_dir: config.input_dir.clone(),
                output_dir: DirectoryPlanner::tile_dir(
                    output_dir,
                    &settings.tile_size,
                    &settings.step_size,
                ),
                tile_size: settings.tile_size.clone(),
                step_size: settings.step_size.clone(),
                time_ids: config.time_ids.clone(),
                channel_ids: settings.channels.clone(),
                slice_ids: config.slice_ids.clone(),
                hist_clip_limits: settings.hist_clip_limits,
                flat_field_dir: flat_field_dir.clone(),
                isotropic: settings.isotropic,
            };

            // Foreground filtering needs the masks produced by this run
            let mode = match (settings.min_fraction, &masks) {
                (Some(min_fraction), Some(mask_stage)) => TilingMode::Masked(MaskedTileOptions {
                    min_fraction,
                    mask_dir: mask_stage.request.output_dir.clone(),
                    tile_mask_dir: settings.save_cropped_masks.then(|| {
                        DirectoryPlanner::tile_mask_dir(
                            output_dir,
                            &settings.tile_size,
                            &settings.step_size,
                        )
                    }),
                }),
                _ => TilingMode::Unconstrained,
            };

            Some(TilingStage { request, mode })
        } else {
            None
        };

        Ok(Self {
            flat_field,
            masks,
            tiling,
        })
    }

    /// Stages that will run, in execution order
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        if self.flat_field.is_some() {
            stages.push(Stage::FlatField);
        }
        if self.masks.is_some() {
            stages.push(Stage::Masks);
        }
        if self.tiling.is_some() {
            stages.push(Stage::Tiling);
        }
        stages
    }

    pub fn flat_field_dir(&self) -> Option<&Path> {
        self.flat_field.as_ref().map(|ff| ff.flat_field_dir.as_path())
    }

    pub fn mask_dir(&self) -> Option<&Path> {
        self.masks.as_ref().map(|m| m.request.output_dir.as_path())
    }

    pub fn tile_dir(&self) -> Option<&Path> {
        self.tiling.as_ref().map(|t| t.request.output_dir.as_path())
    }

    pub fn tile_mask_dir(&self) -> Option<&Path> {
        match &self.tiling {
            Some(TilingStage {
                mode: TilingMode::Masked(options),
                ..
            }) => options.tile_mask_dir.as_deref(),
            _ => None,
        }
    }

    /// Directories a stage writes into, created right before it runs
    pub fn directories_for(&self, stage: Stage) -> Vec<PathBuf> {
        match stage {
            Stage::FlatField => self.flat_field_dir().map(Path::to_path_buf).into_iter().collect(),
            Stage::Masks => self.mask_dir().map(Path::to_path_buf).into_iter().collect(),
            Stage::Tiling => self
                .tile_dir()
                .into_iter()
                .chain(self.tile_mask_dir())
                .map(Path::to_path_buf)
                .collect(),
        }
    }
}

fn missing(field: &str) -> PreprocessError {
    PreprocessError::validation_with_code(
        ErrorCode::VALIDATION_GENERIC,
        "required by an enabled stage",
        Some(field.to_string()),
    )
}

//! Preprocessing configuration
//!
//! The configuration document is YAML. It is deserialized into
//! [`PreprocessConfig`] and checked once by [`ConfigValidator`] when it is
//! loaded, so later stages can rely on every field they need being present.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod ids;
pub mod loader;
pub mod validator;

#[cfg(test)]
mod tests;

pub use ids::IdSelection;
pub use loader::{ConfigLoader, LoadedConfig};
pub use validator::ConfigValidator;

/// Default radius of the structuring element used to clean up masks
pub const DEFAULT_STR_ELEM_RADIUS: u32 = 5;

/// Top-level preprocessing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Directory holding the raw image stack
    pub input_dir: PathBuf,
    /// Root under which every derived directory is created
    pub output_dir: PathBuf,
    #[serde(default)]
    pub slice_ids: IdSelection,
    #[serde(default)]
    pub time_ids: IdSelection,
    /// Estimate flat-field images before any other stage
    pub correct_flat_field: bool,
    /// Generate binary masks from `masks.channels`
    pub use_masks: bool,
    #[serde(default)]
    pub masks: Option<MaskSettings>,
    /// Split the stack into tiles using the `tile` settings
    pub tile_stack: bool,
    #[serde(default)]
    pub tile: Option<TileSettings>,
    #[serde(default)]
    pub collaborators: CollaboratorSettings,
}

/// Settings for the mask generation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskSettings {
    /// Channels the masks are computed from, in the order given
    #[serde(default)]
    pub channels: Vec<u32>,
    #[serde(default = "default_str_elem_radius")]
    pub str_elem_radius: u32,
}

/// Settings for the tiling stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSettings {
    /// Tile extent per dimension
    #[serde(default)]
    pub tile_size: Vec<u32>,
    /// Stride per dimension; must have the same length as `tile_size`
    #[serde(default)]
    pub step_size: Vec<u32>,
    #[serde(default)]
    pub isotropic: bool,
    #[serde(default, alias = "channel_ids")]
    pub channels: IdSelection,
    /// Lower and upper percentile used to clip intensities
    #[serde(default)]
    pub hist_clip_limits: Option<[f64; 2]>,
    /// Minimum foreground fraction a tile needs to be kept
    #[serde(default)]
    pub min_fraction: Option<f64>,
    #[serde(default)]
    pub save_cropped_masks: bool,
}

/// How each external collaborator is invoked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollaboratorSettings {
    #[serde(default)]
    pub flat_field: Option<CommandSettings>,
    #[serde(default)]
    pub masks: Option<CommandSettings>,
    #[serde(default)]
    pub tiling: Option<CommandSettings>,
}

/// An external command and its fixed arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSettings {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl CommandSettings {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }
}

fn default_str_elem_radius() -> u32 {
    DEFAULT_STR_ELEM_RADIUS
}

impl PreprocessConfig {
    /// Minimal configuration with every stage disabled
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            slice_ids: IdSelection::All,
            time_ids: IdSelection::All,
            correct_flat_field: false,
            use_masks: false,
            masks: None,
            tile_stack: false,
            tile: None,
            collaborators: CollaboratorSettings::default(),
        }
    }

    /// Enable mask generation for the given channels
    pub fn with_masks(mut self, channels: Vec<u32>) -> Self {
        self.use_masks = true;
        self.masks = Some(MaskSettings {
            channels,
            str_elem_radius: DEFAULT_STR_ELEM_RADIUS,
        });
        self
    }

    /// Enable tiling with the given tile and step sizes
    pub fn with_tiling(mut self, tile_size: Vec<u32>, step_size: Vec<u32>) -> Self {
        self.tile_stack = true;
        self.tile = Some(TileSettings::new(tile_size, step_size));
        self
    }

    pub fn with_flat_field(mut self, enabled: bool) -> Self {
        self.correct_flat_field = enabled;
        self
    }
}

impl TileSettings {
    pub fn new(tile_size: Vec<u32>, step_size: Vec<u32>) -> Self {
        Self {
            tile_size,
            step_size,
            isotropic: false,
            channels: IdSelection::All,
            hist_clip_limits: None,
            min_fraction: None,
            save_cropped_masks: false,
        }
    }
}

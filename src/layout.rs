//! Output directory layout
//!
//! Every derived directory name is a pure function of configuration
//! values, so repeated runs with the same configuration reuse the same
//! directories.

use crate::error::{PreprocessError, Result};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Name of the flat-field directory under `output_dir`
pub const FLAT_FIELD_DIR_NAME: &str = "flat_field_images";

pub struct DirectoryPlanner;

impl DirectoryPlanner {
    pub fn flat_field_dir(output_dir: &Path) -> PathBuf {
        output_dir.join(FLAT_FIELD_DIR_NAME)
    }

    /// `mask_channels_<c1>-<c2>-...`, channels in the order given
    pub fn mask_dir(output_dir: &Path, channels: &[u32]) -> PathBuf {
        output_dir.join(format!("mask_channels_{}", dash_join(channels)))
    }

    /// `tiles_<w>-<h>..._step_<sw>-<sh>...`
    pub fn tile_dir(output_dir: &Path, tile_size: &[u32], step_size: &[u32]) -> PathBuf {
        output_dir.join(format!("tiles_{}", size_suffix(tile_size, step_size)))
    }

    /// `mask_tiles_<w>-<h>..._step_<sw>-<sh>...`
    pub fn tile_mask_dir(output_dir: &Path, tile_size: &[u32], step_size: &[u32]) -> PathBuf {
        output_dir.join(format!("mask_tiles_{}", size_suffix(tile_size, step_size)))
    }

    /// Create a directory and its parents, succeeding if it already exists
    pub async fn ensure_dir(path: &Path) -> Result<()> {
        trace!("Ensuring directory exists: {}", path.display());
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            PreprocessError::from(e)
                .with_context(format!("failed to create directory {}", path.display()))
                .with_path(path)
        })
    }
}

fn size_suffix(tile_size: &[u32], step_size: &[u32]) -> String {
    format!("{}_step_{}", dash_join(tile_size), dash_join(step_size))
}

fn dash_join<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-")
}

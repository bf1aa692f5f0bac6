//! Provenance record for a preprocessing run
//!
//! After every stage has succeeded, the paths produced by the run and the
//! configuration that drove it are written to
//! `<output_dir>/preprocessing_info.json`. Nothing is written for a run
//! that fails.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::LoadedConfig;
use crate::error::{PreprocessError, Result};
use crate::stages::StageOutputs;

/// File name of the record under `output_dir`
pub const RECORD_FILE_NAME: &str = "preprocessing_info.json";

/// What a run produced and where
///
/// A directory is `Some` exactly when its stage ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub flat_field_dir: Option<PathBuf>,
    pub mask_dir: Option<PathBuf>,
    pub tile_dir: Option<PathBuf>,
    pub tile_mask_dir: Option<PathBuf>,
    /// The configuration document as loaded
    pub config: serde_json::Value,
}

impl ProcessingRecord {
    pub fn new(loaded: &LoadedConfig, outputs: StageOutputs) -> Self {
        Self {
            input_dir: loaded.config.input_dir.clone(),
            output_dir: loaded.config.output_dir.clone(),
            flat_field_dir: outputs.flat_field_dir,
            mask_dir: outputs.mask_dir,
            tile_dir: outputs.tile_dir,
            tile_mask_dir: outputs.tile_mask_dir,
            config: loaded.raw.clone(),
        }
    }

    pub fn path_in(output_dir: &Path) -> PathBuf {
        output_dir.join(RECORD_FILE_NAME)
    }
}

pub struct ProvenanceWriter;

impl ProvenanceWriter {
    /// Serialize the record and write it under its output directory,
    /// replacing any previous record
    pub async fn write(record: &ProcessingRecord) -> Result<PathBuf> {
        let path = ProcessingRecord::path_in(&record.output_dir);
        let json = serde_json::to_string_pretty(record)?;

        // The output directory only exists already if some stage ran
        tokio::fs::create_dir_all(&record.output_dir)
            .await
            .map_err(|e| {
                PreprocessError::from(e)
                    .with_context("failed to create output directory")
                    .with_path(&record.output_dir)
            })?;
        tokio::fs::write(&path, json).await.map_err(|e| {
            PreprocessError::from(e)
                .with_context("failed to write processing record")
                .with_path(&path)
        })?;

        info!("Wrote processing record to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use tempfile::TempDir;

    async fn read_record(output_dir: &Path) -> ProcessingRecord {
        let content = tokio::fs::read_to_string(ProcessingRecord::path_in(output_dir))
            .await
            .unwrap();
        serde_json::from_str(&content).unwrap()
    }

    fn loaded_config(output_dir: &Path) -> LoadedConfig {
        let document = format!(
            "input_dir: /data/raw\noutput_dir: {}\ncorrect_flat_field: true\nuse_masks: false\ntile_stack: false\nnote: kept\n",
            output_dir.display()
        );
        ConfigLoader::load_from_str(&document, Path::new("config.yml")).unwrap()
    }

    #[tokio::test]
    async fn test_write_and_read_record() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = loaded_config(temp_dir.path());
        let outputs = StageOutputs {
            flat_field_dir: Some(temp_dir.path().join("flat_field_images")),
            ..Default::default()
        };
        let record = ProcessingRecord::new(&loaded, outputs);

        let path = ProvenanceWriter::write(&record).await.unwrap();
        assert_eq!(path, temp_dir.path().join(RECORD_FILE_NAME));

        let read_back = read_record(temp_dir.path()).await;
        assert_eq!(read_back, record);
        assert_eq!(read_back.config["note"], "kept");
    }

    #[tokio::test]
    async fn test_skipped_stages_serialize_as_null() {
        let temp_dir = TempDir::new().unwrap();
        let record = ProcessingRecord::new(&loaded_config(temp_dir.path()), StageOutputs::default());
        ProvenanceWriter::write(&record).await.unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join(RECORD_FILE_NAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        for key in ["flat_field_dir", "mask_dir", "tile_dir", "tile_mask_dir"] {
            assert!(value[key].is_null(), "{key} should be null");
        }
        assert_eq!(value["input_dir"], "/data/raw");
        // Pretty-printed for humans
        assert!(content.contains("\n  \"config\""));
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_record() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(RECORD_FILE_NAME), "stale").unwrap();

        let record = ProcessingRecord::new(&loaded_config(temp_dir.path()), StageOutputs::default());
        ProvenanceWriter::write(&record).await.unwrap();

        let read_back = read_record(temp_dir.path()).await;
        assert_eq!(read_back, record);
    }

    #[tokio::test]
    async fn test_write_creates_missing_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("fresh");
        let record = ProcessingRecord::new(&loaded_config(&output_dir), StageOutputs::default());

        ProvenanceWriter::write(&record).await.unwrap();
        assert!(output_dir.join(RECORD_FILE_NAME).is_file());
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = loaded_config(temp_dir.path());
        let first = serde_json::to_string_pretty(&ProcessingRecord::new(
            &loaded,
            StageOutputs::default(),
        ))
        .unwrap();
        let second = serde_json::to_string_pretty(&ProcessingRecord::new(
            &loaded_config(temp_dir.path()),
            StageOutputs::default(),
        ))
        .unwrap();
        assert_eq!(first, second);
    }
}

use super::{ConfigValidator, PreprocessConfig};
use crate::error::{ErrorCode, PreprocessError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A validated configuration together with the document it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PreprocessConfig,
    /// The document as written, including keys the typed view ignores
    pub raw: serde_json::Value,
    pub source: PathBuf,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a configuration document
    pub async fn load(path: &Path) -> Result<LoadedConfig> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PreprocessError::config_with_code(
                    ErrorCode::CONFIG_NOT_FOUND,
                    format!("Configuration file not found: {}", path.display()),
                )
                .with_source(e)
            } else {
                PreprocessError::from(e)
                    .with_context(format!("failed to read {}", path.display()))
                    .with_path(path)
            }
        })?;

        let loaded = Self::load_from_str(&content, path)?;
        debug!(
            "Loaded configuration from {} (flat_field={}, masks={}, tiling={})",
            path.display(),
            loaded.config.correct_flat_field,
            loaded.config.use_masks,
            loaded.config.tile_stack
        );
        Ok(loaded)
    }

    /// Parse and validate a document already in memory
    pub fn load_from_str(content: &str, source: &Path) -> Result<LoadedConfig> {
        let document: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| {
            PreprocessError::from(e).with_context(format!("in {}", source.display()))
        })?;

        if !document.is_mapping() {
            return Err(PreprocessError::config_with_code(
                ErrorCode::CONFIG_INVALID_YAML,
                format!(
                    "Configuration in {} must be a mapping at the top level",
                    source.display()
                ),
            ));
        }

        let config: PreprocessConfig =
            serde_yaml::from_value(document.clone()).map_err(|e| {
                let code = if e.to_string().contains("missing field") {
                    ErrorCode::CONFIG_MISSING_REQUIRED
                } else {
                    ErrorCode::CONFIG_INVALID_VALUE
                };
                PreprocessError::config_with_code(
                    code,
                    format!("Invalid configuration in {}: {}", source.display(), e),
                )
                .with_source(e)
            })?;

        ConfigValidator::validate(&config)?;

        let raw = serde_json::to_value(&document).map_err(|e| {
            PreprocessError::config(format!(
                "Configuration in {} cannot be represented as JSON",
                source.display()
            ))
            .with_source(e)
        })?;

        Ok(LoadedConfig {
            config,
            raw,
            source: source.to_path_buf(),
        })
    }
}

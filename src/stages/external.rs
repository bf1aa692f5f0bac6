//! Collaborators backed by external commands
//!
//! Each operation spawns the configured program once and writes a single
//! JSON object to its stdin:
//!
//! ```json
//! {"operation": "tile_with_mask", "request": {...}, "options": {...}}
//! ```
//!
//! Exit status 0 means the operation succeeded. Anything else fails the
//! stage with the program's stderr attached.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::{
    Collaborators, FlatFieldEstimator, FlatFieldRequest, MaskOptions, MaskProcessor, MaskRequest,
    MaskedTileOptions, Stage, StackTiler, TileRequest,
};
use crate::config::{CollaboratorSettings, CommandSettings};
use crate::error::{PreprocessError, Result};
use crate::subprocess::{ProcessCommand, ProcessError, SubprocessManager};

pub const DEFAULT_FLAT_FIELD_PROGRAM: &str = "stackprep-flat-field";
pub const DEFAULT_MASKS_PROGRAM: &str = "stackprep-masks";
pub const DEFAULT_TILING_PROGRAM: &str = "stackprep-tile";

/// Environment variable telling the child which stage invoked it
pub const STAGE_ENV_VAR: &str = "STACKPREP_STAGE";

#[derive(Serialize)]
struct Invocation<'a, R: Serialize> {
    operation: &'a str,
    request: &'a R,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<serde_json::Value>,
}

/// One external command serving one pipeline stage
pub struct ExternalCollaborator {
    stage: Stage,
    settings: CommandSettings,
    subprocess: SubprocessManager,
}

impl ExternalCollaborator {
    pub fn new(stage: Stage, settings: CommandSettings, subprocess: SubprocessManager) -> Self {
        Self {
            stage,
            settings,
            subprocess,
        }
    }

    async fn invoke<R, O>(&self, operation: &str, request: &R, options: Option<&O>) -> Result<()>
    where
        R: Serialize + Sync,
        O: Serialize + Sync,
    {
        let invocation = Invocation {
            operation,
            request,
            options: options.map(serde_json::to_value).transpose()?,
        };
        let payload = serde_json::to_string(&invocation)?;

        let command = ProcessCommand::new(&self.settings.program)
            .args(&self.settings.args)
            .env(STAGE_ENV_VAR, self.stage.as_str())
            .timeout(self.settings.timeout)
            .input(payload);
        let command_line = command.to_string();

        debug!("Invoking {} for {} ({})", command_line, self.stage, operation);

        let output = self
            .subprocess
            .run(command)
            .await
            .map_err(|e| self.process_failure(e, &command_line))?;

        for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!("[{}] {}", self.stage, line);
        }

        if let Err(e) = output.status.check() {
            let stderr = output.stderr.trim();
            let failure = self.process_failure(e, &command_line);
            return Err(if stderr.is_empty() {
                failure
            } else {
                failure.with_context(stderr)
            });
        }

        Ok(())
    }

    fn process_failure(&self, error: ProcessError, command_line: &str) -> PreprocessError {
        PreprocessError::from(error)
            .with_command(command_line)
            .with_stage(self.stage.as_str())
    }
}

#[async_trait]
impl FlatFieldEstimator for ExternalCollaborator {
    async fn estimate(&self, request: &FlatFieldRequest) -> Result<()> {
        self.invoke::<_, ()>("estimate", request, None).await
    }
}

#[async_trait]
impl MaskProcessor for ExternalCollaborator {
    async fn generate_masks(&self, request: &MaskRequest, options: &MaskOptions) -> Result<()> {
        self.invoke("generate_masks", request, Some(options)).await
    }
}

#[async_trait]
impl StackTiler for ExternalCollaborator {
    async fn tile(&self, request: &TileRequest) -> Result<()> {
        self.invoke::<_, ()>("tile", request, None).await
    }

    async fn tile_with_mask(
        &self,
        request: &TileRequest,
        options: &MaskedTileOptions,
    ) -> Result<()> {
        self.invoke("tile_with_mask", request, Some(options)).await
    }
}

impl Collaborators {
    /// Collaborators that run external commands, using defaults for any
    /// stage the configuration leaves unset
    pub fn external(settings: &CollaboratorSettings, subprocess: SubprocessManager) -> Self {
        let command = |configured: &Option<CommandSettings>, default_program: &str| {
            configured
                .clone()
                .unwrap_or_else(|| CommandSettings::new(default_program))
        };

        Self::new(
            Arc::new(ExternalCollaborator::new(
                Stage::FlatField,
                command(&settings.flat_field, DEFAULT_FLAT_FIELD_PROGRAM),
                subprocess.clone(),
            )),
            Arc::new(ExternalCollaborator::new(
                Stage::Masks,
                command(&settings.masks, DEFAULT_MASKS_PROGRAM),
                subprocess.clone(),
            )),
            Arc::new(ExternalCollaborator::new(
                Stage::Tiling,
                command(&settings.tiling, DEFAULT_TILING_PROGRAM),
                subprocess,
            )),
        )
    }
}

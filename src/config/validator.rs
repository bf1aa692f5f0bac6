use super::{CommandSettings, MaskSettings, PreprocessConfig, TileSettings};
use crate::error::{ErrorCode, PreprocessError, Result};

/// A single problem found in a configuration, keyed by dotted field path
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a configuration, reporting every issue found in one error
    pub fn validate(config: &PreprocessConfig) -> Result<()> {
        let issues = Self::collect_issues(config);
        match issues.as_slice() {
            [] => Ok(()),
            [issue] => Err(PreprocessError::validation_with_code(
                ErrorCode::VALIDATION_GENERIC,
                issue.message.clone(),
                Some(issue.field.clone()),
            )),
            _ => {
                let details: Vec<String> = issues
                    .iter()
                    .map(|issue| format!("{}: {}", issue.field, issue.message))
                    .collect();
                Err(PreprocessError::validation(format!(
                    "{} problems found: {}",
                    issues.len(),
                    details.join("; ")
                )))
            }
        }
    }

    pub fn collect_issues(config: &PreprocessConfig) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if config.input_dir.as_os_str().is_empty() {
            issues.push(ValidationIssue::new("input_dir", "must not be empty"));
        }
        if config.output_dir.as_os_str().is_empty() {
            issues.push(ValidationIssue::new("output_dir", "must not be empty"));
        }

        if config.use_masks {
            match &config.masks {
                Some(masks) => Self::validate_masks(masks, &mut issues),
                None => issues.push(ValidationIssue::new(
                    "masks",
                    "required when use_masks is true",
                )),
            }
        }

        if config.tile_stack {
            match &config.tile {
                Some(tile) => Self::validate_tile(tile, &mut issues),
                None => issues.push(ValidationIssue::new(
                    "tile",
                    "required when tile_stack is true",
                )),
            }
        }

        let collaborators = &config.collaborators;
        for (name, settings) in [
            ("collaborators.flat_field", &collaborators.flat_field),
            ("collaborators.masks", &collaborators.masks),
            ("collaborators.tiling", &collaborators.tiling),
        ] {
            if let Some(settings) = settings {
                Self::validate_command(name, settings, &mut issues);
            }
        }

        issues
    }

    fn validate_masks(masks: &MaskSettings, issues: &mut Vec<ValidationIssue>) {
        if masks.channels.is_empty() {
            issues.push(ValidationIssue::new(
                "masks.channels",
                "at least one channel is required when use_masks is true",
            ));
        }
    }

    fn validate_tile(tile: &TileSettings, issues: &mut Vec<ValidationIssue>) {
        if tile.tile_size.is_empty() {
            issues.push(ValidationIssue::new("tile.tile_size", "is required"));
        }
        if tile.step_size.is_empty() {
            issues.push(ValidationIssue::new("tile.step_size", "is required"));
        }
        if !tile.tile_size.is_empty()
            && !tile.step_size.is_empty()
            && tile.tile_size.len() != tile.step_size.len()
        {
            issues.push(ValidationIssue::new(
                "tile.step_size",
                format!(
                    "has {} dimensions but tile.tile_size has {}",
                    tile.step_size.len(),
                    tile.tile_size.len()
                ),
            ));
        }
        if tile.tile_size.contains(&0) {
            issues.push(ValidationIssue::new(
                "tile.tile_size",
                "every dimension must be greater than 0",
            ));
        }
        if tile.step_size.contains(&0) {
            issues.push(ValidationIssue::new(
                "tile.step_size",
                "every dimension must be greater than 0",
            ));
        }

        if let Some([low, high]) = tile.hist_clip_limits {
            if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
                issues.push(ValidationIssue::new(
                    "tile.hist_clip_limits",
                    format!("expected 0 <= low < high <= 100, got [{low}, {high}]"),
                ));
            }
        }

        if let Some(fraction) = tile.min_fraction {
            if !(0.0..=1.0).contains(&fraction) {
                issues.push(ValidationIssue::new(
                    "tile.min_fraction",
                    format!("must be within [0, 1], got {fraction}"),
                ));
            }
        }
    }

    fn validate_command(name: &str, settings: &CommandSettings, issues: &mut Vec<ValidationIssue>) {
        if settings.program.trim().is_empty() {
            issues.push(ValidationIssue::new(
                format!("{name}.program"),
                "must not be empty",
            ));
        }
        if settings.timeout.is_some_and(|t| t.is_zero()) {
            issues.push(ValidationIssue::new(
                format!("{name}.timeout"),
                "must be greater than zero",
            ));
        }
    }
}

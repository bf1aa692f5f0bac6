use super::*;
use crate::error::{ErrorCode, PreprocessError};
use std::path::Path;
use std::time::Duration;

const FULL_CONFIG: &str = r#"
input_dir: /data/raw
output_dir: /data/processed
slice_ids: [10, 11]
time_ids: -1
correct_flat_field: true
use_masks: true
masks:
  channels: [2, 0]
tile_stack: true
tile:
  tile_size: [256, 256]
  step_size: [128, 128]
  channels: all
  hist_clip_limits: [1, 99]
  min_fraction: 0.25
  save_cropped_masks: true
collaborators:
  tiling:
    program: python
    args: ["-m", "tiler"]
    timeout: 2h
experiment: run-17
"#;

fn load(content: &str) -> crate::error::Result<LoadedConfig> {
    ConfigLoader::load_from_str(content, Path::new("test.yml"))
}

#[test]
fn test_full_config_parses_with_defaults() {
    let loaded = load(FULL_CONFIG).unwrap();
    let config = &loaded.config;

    assert_eq!(config.input_dir, Path::new("/data/raw"));
    assert_eq!(config.slice_ids, IdSelection::Specific(vec![10, 11]));
    assert_eq!(config.time_ids, IdSelection::All);

    let masks = config.masks.as_ref().unwrap();
    assert_eq!(masks.channels, vec![2, 0]);
    assert_eq!(masks.str_elem_radius, DEFAULT_STR_ELEM_RADIUS);

    let tile = config.tile.as_ref().unwrap();
    assert!(!tile.isotropic);
    assert_eq!(tile.channels, IdSelection::All);
    assert_eq!(tile.hist_clip_limits, Some([1.0, 99.0]));
    assert_eq!(tile.min_fraction, Some(0.25));
    assert!(tile.save_cropped_masks);

    let tiling = config.collaborators.tiling.as_ref().unwrap();
    assert_eq!(tiling.program, "python");
    assert_eq!(tiling.args, vec!["-m", "tiler"]);
    assert_eq!(tiling.timeout, Some(Duration::from_secs(7200)));
    assert!(config.collaborators.flat_field.is_none());
}

#[test]
fn test_raw_document_keeps_unknown_keys() {
    let loaded = load(FULL_CONFIG).unwrap();
    assert_eq!(loaded.raw["experiment"], "run-17");
    assert_eq!(loaded.raw["masks"]["channels"], serde_json::json!([2, 0]));
}

#[test]
fn test_id_selections_default_to_all() {
    let loaded = load(
        r#"
input_dir: in
output_dir: out
correct_flat_field: false
use_masks: false
tile_stack: false
"#,
    )
    .unwrap();
    assert_eq!(loaded.config.slice_ids, IdSelection::All);
    assert_eq!(loaded.config.time_ids, IdSelection::All);
}

#[test]
fn test_tile_channel_ids_alias() {
    let loaded = load(
        r#"
input_dir: in
output_dir: out
correct_flat_field: false
use_masks: false
tile_stack: true
tile:
  tile_size: [64, 64]
  step_size: [64, 64]
  channel_ids: [1]
  isotropic: true
"#,
    )
    .unwrap();
    let tile = loaded.config.tile.unwrap();
    assert_eq!(tile.channels, IdSelection::Specific(vec![1]));
    assert!(tile.isotropic);
}

#[test]
fn test_missing_stage_flag_is_config_error() {
    let err = load(
        r#"
input_dir: in
output_dir: out
use_masks: false
tile_stack: false
"#,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
    assert!(err.to_string().contains("correct_flat_field"));
}

#[test]
fn test_invalid_value_is_not_reported_as_missing() {
    let err = load(
        r#"
input_dir: in
output_dir: out
slice_ids: -5
correct_flat_field: false
use_masks: false
tile_stack: false
"#,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    assert!(err.to_string().contains("invalid index -5"));
    assert_eq!(err.exit_code(), 2);

    let err = load(
        r#"
input_dir: in
output_dir: out
correct_flat_field: false
use_masks: [1]
tile_stack: false
"#,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
}

#[test]
fn test_malformed_yaml_is_config_error() {
    let err = load("input_dir: [unclosed").unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_YAML);
}

#[test]
fn test_non_mapping_document_rejected() {
    let err = load("- just\n- a list\n").unwrap_err();
    assert!(matches!(err, PreprocessError::Config { .. }));
}

#[test]
fn test_masks_without_channels_fails_validation() {
    let err = load(
        r#"
input_dir: in
output_dir: out
correct_flat_field: false
use_masks: true
masks:
  str_elem_radius: 3
tile_stack: false
"#,
    )
    .unwrap_err();
    match err {
        PreprocessError::Validation { field, .. } => {
            assert_eq!(field.as_deref(), Some("masks.channels"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_unused_stage_settings_are_not_validated() {
    let loaded = load(
        r#"
input_dir: in
output_dir: out
correct_flat_field: false
use_masks: false
masks:
  str_elem_radius: 3
tile_stack: false
"#,
    );
    assert!(loaded.is_ok());
}

#[test]
fn test_multiple_issues_reported_together() {
    let mut config = PreprocessConfig::new("in", "out").with_tiling(vec![32, 0], vec![16]);
    if let Some(tile) = config.tile.as_mut() {
        tile.min_fraction = Some(1.5);
        tile.hist_clip_limits = Some([90.0, 10.0]);
    }

    let issues = ConfigValidator::collect_issues(&config);
    let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "tile.step_size",
            "tile.tile_size",
            "tile.hist_clip_limits",
            "tile.min_fraction"
        ]
    );

    let err = ConfigValidator::validate(&config).unwrap_err();
    assert!(err.to_string().contains("4 problems found"));
}

#[test]
fn test_tiling_requires_tile_section() {
    let mut config = PreprocessConfig::new("in", "out");
    config.tile_stack = true;
    let issues = ConfigValidator::collect_issues(&config);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, "tile");
}

#[test]
fn test_empty_collaborator_program_rejected() {
    let mut config = PreprocessConfig::new("in", "out");
    config.collaborators.masks = Some(CommandSettings::new("  "));
    let issues = ConfigValidator::collect_issues(&config);
    assert_eq!(issues[0].field, "collaborators.masks.program");
}

#[tokio::test]
async fn test_load_missing_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let err = ConfigLoader::load(&temp_dir.path().join("absent.yml"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
}

#[tokio::test]
async fn test_load_from_disk() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("preprocess.yml");
    std::fs::write(&path, FULL_CONFIG).unwrap();

    let loaded = ConfigLoader::load(&path).await.unwrap();
    assert_eq!(loaded.source, path);
    assert!(loaded.config.tile_stack);
}

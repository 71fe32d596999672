use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::LayoutConfig;

/// File name looked up next to a board when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "mindtree.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Read and validate a layout config file.
pub fn read_config(path: &Path) -> Result<LayoutConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: LayoutConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Pick the config for a board: an explicit path must exist; otherwise
/// `mindtree.toml` beside the board is used when present, else defaults.
pub fn resolve_config(explicit: Option<&Path>, board_path: &Path) -> Result<LayoutConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let beside = board_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(CONFIG_FILE_NAME);
    if beside.is_file() {
        log::debug!("event=config_discovered path={}", beside.display());
        return read_config(&beside);
    }
    Ok(LayoutConfig::default())
}

fn validate(config: &LayoutConfig) -> Result<(), ConfigError> {
    let gaps = [
        ("horizontal_gap", config.horizontal_gap),
        ("vertical_gap", config.vertical_gap),
        ("heights.base", config.heights.base),
        ("heights.subtask_row", config.heights.subtask_row),
        ("heights.metadata_row", config.heights.metadata_row),
        ("heights.link_row", config.heights.link_row),
    ];
    for (name, value) in gaps {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }
    if !config.default_width.is_finite() || config.default_width <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "default_width must be positive, got {}",
            config.default_width
        )));
    }
    Ok(())
}

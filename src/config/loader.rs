//! Settings loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::HoneytrapSettings;
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

pub(crate) fn join_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<HoneytrapSettings, SettingsError> {
    let content = fs::read_to_string(path)?;
    let settings: HoneytrapSettings = toml::from_str(&content)?;

    validate_settings(&settings).map_err(SettingsError::Validation)?;

    Ok(settings)
}

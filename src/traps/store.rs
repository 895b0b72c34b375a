//! Trap configuration loading.
//!
//! The configuration is looked up through an ordered list of candidate
//! paths. The first candidate that exists is loaded; a candidate that does
//! not exist is skipped. A candidate that exists but cannot be parsed is
//! fatal: the operator pointed at it, so silently falling through to the next
//! one would serve the wrong traps.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config::loader::join_errors;
use crate::config::validation::ValidationError;
use crate::traps::schema::TrapConfig;
use crate::traps::validation::validate_trap_config;

/// Error type for trap configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no trap configuration found (tried: {})", display_paths(.0))]
    NotFound(Vec<PathBuf>),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed trap configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("trap configuration must be a JSON object")]
    NotAnObject,
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a trap configuration document.
pub fn parse_trap_config(content: &str) -> Result<TrapConfig, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(ConfigError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

/// Read the first existing candidate. `Ok(None)` when none exists.
pub(crate) fn read_first_existing(
    candidates: &[PathBuf],
) -> Result<Option<(PathBuf, String)>, (PathBuf, std::io::Error)> {
    for path in candidates {
        match fs::read_to_string(path) {
            Ok(content) => return Ok(Some((path.clone(), content))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Candidate not present");
            }
            Err(e) => return Err((path.clone(), e)),
        }
    }
    Ok(None)
}

/// Load and validate the trap configuration from the first existing candidate.
///
/// Returns the configuration together with the path it came from.
pub fn load_trap_config(
    candidates: &[PathBuf],
    reserved_paths: &[String],
) -> Result<(TrapConfig, PathBuf), ConfigError> {
    let (path, content) = read_first_existing(candidates)
        .map_err(|(path, source)| ConfigError::Io { path, source })?
        .ok_or_else(|| ConfigError::NotFound(candidates.to_vec()))?;

    let config = parse_trap_config(&content)?;
    validate_trap_config(&config, reserved_paths).map_err(ConfigError::Validation)?;

    tracing::info!(
        path = %path.display(),
        traps = config.traps.len(),
        tokens = config.token_count(),
        "Trap configuration loaded"
    );
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_ONLY: &str =
        r#"{"traps": {}, "default-http-response": {"content-type": "text/html", "body": "404.html"}}"#;

    fn temp_file(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("honeytrap-traps-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(matches!(parse_trap_config("[1, 2]"), Err(ConfigError::NotAnObject)));
        assert!(matches!(parse_trap_config("\"x\""), Err(ConfigError::NotAnObject)));
    }

    #[test]
    fn rejects_missing_default_response() {
        let err = parse_trap_config(r#"{"traps": {}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("default-http-response"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_trap_config("{not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn first_existing_candidate_wins() {
        let missing = std::env::temp_dir().join("honeytrap-definitely-missing.json");
        let first = temp_file(DEFAULT_ONLY);
        let second = temp_file(
            r#"{"default-http-response": {"content-type": "text/plain", "body": "other.txt"}}"#,
        );

        let (config, from) =
            load_trap_config(&[missing, first.clone(), second.clone()], &[]).unwrap();
        assert_eq!(from, first);
        assert_eq!(config.default_response.body, "404.html");

        fs::remove_file(&first).unwrap_or_default();
        fs::remove_file(&second).unwrap_or_default();
    }

    #[test]
    fn malformed_candidate_is_fatal_even_if_later_ones_are_fine() {
        let broken = temp_file("{\"traps\": ");
        let good = temp_file(DEFAULT_ONLY);

        let err = load_trap_config(&[broken.clone(), good.clone()], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        fs::remove_file(&broken).unwrap_or_default();
        fs::remove_file(&good).unwrap_or_default();
    }

    #[test]
    fn no_candidate_is_not_found() {
        let missing = std::env::temp_dir().join("honeytrap-definitely-missing.json");
        let err = load_trap_config(&[missing], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(ref tried) if tried.len() == 1));
    }

    #[test]
    fn validation_errors_surface() {
        let path = temp_file(
            r#"{"traps": {"/favicon.ico": {}}, "default-http-response": {"content-type": "text/html", "body": "404.html"}}"#,
        );
        let err = load_trap_config(&[path.clone()], &["/favicon.ico".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        fs::remove_file(&path).unwrap_or_default();
    }
}

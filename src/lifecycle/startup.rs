//! Startup orchestration.
//!
//! # Responsibilities
//! - Locate and load the primary trap configuration
//! - Merge traps derived from the optional topology document
//! - Validate the merged result once more before it is frozen
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing derived document is normal; a malformed one is not

use std::path::PathBuf;

use crate::config::loader::join_errors;
use crate::config::validation::ValidationError;
use crate::config::HoneytrapSettings;
use crate::traps::validation::validate_trap_config;
use crate::traps::{load_derived, load_trap_config, merge_derived, ConfigError, DerivedConfigError, TrapConfig};

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Traps(#[from] ConfigError),
    #[error(transparent)]
    Derived(#[from] DerivedConfigError),
    #[error("derived traps invalid: {}", join_errors(.0))]
    Merged(Vec<ValidationError>),
}

/// Load the trap configuration the server will run with.
pub fn load_traps(settings: &HoneytrapSettings) -> Result<TrapConfig, StartupError> {
    let sources = &settings.traps;
    let (mut config, _) = load_trap_config(&to_paths(&sources.config_paths), &sources.reserved_paths)?;

    if let Some(document) = load_derived(&to_paths(&sources.derived_paths))? {
        let added = merge_derived(
            &mut config,
            document,
            &sources.derived_comm_option,
            &settings.responses.empty_json_body,
        );
        validate_trap_config(&config, &sources.reserved_paths).map_err(StartupError::Merged)?;
        tracing::info!(
            derived = added,
            traps = config.traps.len(),
            "Derived traps merged"
        );
    }

    Ok(config)
}

fn to_paths(paths: &[String]) -> Vec<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
}

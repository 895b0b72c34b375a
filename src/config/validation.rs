//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject candidate lists that can never load anything
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HoneytrapSettings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the system

use std::net::SocketAddr;

use crate::config::schema::HoneytrapSettings;

/// A single semantic problem found in the settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate the settings, collecting every error.
pub fn validate_settings(settings: &HoneytrapSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", settings.listener.bind_address),
        ));
    }
    if settings.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }
    if let Some(tls) = &settings.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::new("listener.tls", "cert_path and key_path are required"));
        }
    }

    if settings.traps.config_paths.is_empty() {
        errors.push(ValidationError::new("traps.config_paths", "at least one candidate is required"));
    }
    for path in &settings.traps.reserved_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(
                "traps.reserved_paths",
                format!("'{}' must start with '/'", path),
            ));
        }
    }

    if settings.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if settings.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if settings.observability.metrics_enabled
        && settings.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", settings.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

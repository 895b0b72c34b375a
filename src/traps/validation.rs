//! Trap configuration validation.
//!
//! Serde guarantees the document has the right shape; this pass checks what
//! the shape cannot express. Every problem is reported, not just the first.

use crate::config::validation::ValidationError;
use crate::traps::schema::{ResponseSpec, TrapConfig};

/// Validate a trap configuration against the reserved path list.
pub fn validate_trap_config(
    config: &TrapConfig,
    reserved_paths: &[String],
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_response(&mut errors, "default-http-response", &config.default_response);

    // Sorted so the error list is stable across runs.
    let mut paths: Vec<&String> = config.traps.keys().collect();
    paths.sort();

    for path in paths {
        let entry = &config.traps[path];

        if !path.starts_with('/') {
            errors.push(ValidationError::new(
                format!("traps.{}", path),
                "trap path must start with '/'",
            ));
        }
        if reserved_paths.iter().any(|r| r == path) {
            errors.push(ValidationError::new(
                format!("traps.{}", path),
                "path is reserved and never reaches trap resolution",
            ));
        }
        if let Some(response) = &entry.trap_response {
            check_response(&mut errors, &format!("traps.{}.trap-response", path), response);
        }

        let mut tokens: Vec<&String> = entry.tokens.keys().collect();
        tokens.sort();
        for token in tokens {
            if token.is_empty() {
                errors.push(ValidationError::new(format!("traps.{}", path), "empty token name"));
            }
            if let Some(response) = &entry.tokens[token].token_response {
                check_response(
                    &mut errors,
                    &format!("traps.{}.{}.token-response", path, token),
                    response,
                );
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_response(errors: &mut Vec<ValidationError>, field: &str, response: &ResponseSpec) {
    if response.content_type.trim().is_empty() {
        errors.push(ValidationError::new(field, "content-type must not be empty"));
    }
    if response.body.trim().is_empty() {
        errors.push(ValidationError::new(field, "body must not be empty"));
    }
}

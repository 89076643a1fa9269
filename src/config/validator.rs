//! Configuration validation rules.
//!
//! - Overlay scale must be in (0, 1]
//! - An enabled overlay needs a path
//! - Timeouts, when set, must be finite and positive
//! - The URL template must contain `{key}`

use crate::config::schema::MoonConfig;
use crate::error::{MoonError, Result};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending setting
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &MoonConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let scale = config.overlay.scale;
    if !(scale > 0.0 && scale <= 1.0) {
        errors.push(ValidationError::new(
            "overlay.scale",
            format!("must be in (0, 1], got {}", scale),
        ));
    }
    if config.overlay.enabled && config.overlay.path.is_none() {
        errors.push(ValidationError::new(
            "overlay.path",
            "is required when the overlay is enabled",
        ));
    }

    for (field, value) in [
        ("download.timeout_secs", config.download.timeout_secs),
        ("lease_wait_secs", config.lease_wait_secs),
    ] {
        if let Some(secs) = value {
            if !(secs.is_finite() && secs > 0.0) {
                errors.push(ValidationError::new(
                    field,
                    format!("must be a positive number of seconds, got {}", secs),
                ));
            }
        }
    }

    if !config.download.url_template.contains("{key}") {
        errors.push(ValidationError::new(
            "download.url_template",
            "must contain a {key} placeholder",
        ));
    }

    errors
}

/// Validate a configuration, failing on the first batch of errors.
pub fn validate(config: &MoonConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(MoonError::ConfigValidationError { message })
}

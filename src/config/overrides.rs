//! Environment overrides for [`MoonConfig`].
//!
//! Deployments configure moonframe mostly through environment variables;
//! any variable that is present replaces the corresponding file setting.

use std::path::PathBuf;
use tracing::debug;

use super::env_layer::EnvLayerStack;
use super::schema::MoonConfig;
use crate::error::{MoonError, Result};

pub const HEMISPHERE: &str = "HEMISPHERE";
pub const SAVE_DIR: &str = "SAVE_DIR";
pub const WITH_IMAGE_IN_CENTER: &str = "WITH_IMAGE_IN_CENTER";
pub const CENTER_IMAGE_PATH: &str = "CENTER_IMAGE_PATH";
pub const DOWNLOAD_TIMEOUT_SECONDS: &str = "DOWNLOAD_TIMEOUT_SECONDS";
pub const DOWNLOAD_SECRET_KEY: &str = "DOWNLOAD_SECRET_KEY";
pub const CONSUMER_KEY: &str = "CONSUMER_KEY";
pub const CONSUMER_SECRET: &str = "CONSUMER_SECRET";
pub const INSECURE_TLS_FALLBACK: &str = "INSECURE_TLS_FALLBACK";
pub const ACCOUNT_ENDPOINT: &str = "ACCOUNT_ENDPOINT";

/// Apply every override present in `env` to `config`.
///
/// `DOWNLOAD_TIMEOUT_SECONDS` that is empty or not a number clears the
/// timeout rather than failing.
pub fn apply_env_overrides(config: &mut MoonConfig, env: &EnvLayerStack) -> Result<()> {
    let var = |key: &str| {
        let value = env.get(key);
        if value.is_some() {
            debug!("{} set from {}", key, env.source_of(key).unwrap_or("?"));
        }
        value
    };

    if let Some(value) = var(HEMISPHERE) {
        config.hemisphere = value
            .parse()
            .map_err(|message| MoonError::ConfigValidationError { message })?;
    }
    if let Some(value) = var(SAVE_DIR).filter(|v| !v.is_empty()) {
        config.save_dir = PathBuf::from(value);
    }
    if let Some(value) = var(WITH_IMAGE_IN_CENTER) {
        config.overlay.enabled = is_truthy(value);
    }
    if let Some(value) = var(CENTER_IMAGE_PATH).filter(|v| !v.is_empty()) {
        config.overlay.path = Some(PathBuf::from(value));
    }
    if let Some(value) = var(DOWNLOAD_TIMEOUT_SECONDS) {
        config.download.timeout_secs = float_or_none(value);
    }
    if let Some(value) = var(INSECURE_TLS_FALLBACK) {
        config.download.insecure_tls_fallback = is_truthy(value);
    }
    if let Some(value) = var(DOWNLOAD_SECRET_KEY) {
        config.prefetch_secret = Some(value.to_string());
    }
    if let Some(value) = var(CONSUMER_KEY) {
        config.account.consumer_key = Some(value.to_string());
    }
    if let Some(value) = var(CONSUMER_SECRET) {
        config.account.consumer_secret = Some(value.to_string());
    }
    if let Some(value) = var(ACCOUNT_ENDPOINT) {
        config.account.endpoint = Some(value.to_string());
    }

    Ok(())
}

/// `true`, `t` or `1`, ignoring case.
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "t" | "1")
}

/// Parse a float, treating empty or malformed input as absent.
pub fn float_or_none(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

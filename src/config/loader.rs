//! Configuration file discovery and loading.
//!
//! Settings are resolved in this order (later wins):
//! 1. Built-in defaults
//! 2. `moonframe.yml` in the working directory, or the `--config` file
//! 3. `.env` in the working directory
//! 4. The process environment

use crate::config::env_layer::EnvLayerStack;
use crate::config::overrides::apply_env_overrides;
use crate::config::schema::MoonConfig;
use crate::config::validator::validate;
use crate::error::{MoonError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "moonframe.yml";

/// Find the config file for `dir`, if there is one.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// Load a single config file and parse it into MoonConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<MoonConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MoonError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MoonError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into MoonConfig.
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<MoonConfig> {
    if content.trim().is_empty() {
        return Ok(MoonConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| MoonError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the effective configuration for `dir`.
///
/// An explicit `config_override` must exist; the default file is optional.
pub fn load_config(dir: &Path, config_override: Option<&Path>) -> Result<MoonConfig> {
    let env = EnvLayerStack::standard(dir)?;
    load_config_with_env(dir, config_override, &env)
}

/// Like [`load_config`], with an explicit environment.
pub fn load_config_with_env(
    dir: &Path,
    config_override: Option<&Path>,
    env: &EnvLayerStack,
) -> Result<MoonConfig> {
    let mut config = match config_override {
        Some(path) => load_config_file(path)?,
        None => match find_config_file(dir) {
            Some(path) => load_config_file(&path)?,
            None => {
                debug!("No {} in {:?}, using defaults", CONFIG_FILE_NAME, dir);
                MoonConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config, env)?;
    validate(&config)?;
    Ok(config)
}

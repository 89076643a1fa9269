//! Configuration loading, parsing, and validation for moonframe.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - `.env` parsing in [`env_file`] and layering in [`env_layer`]
//! - Environment overrides in [`overrides`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use moonframe::config::{load_config_with_env, EnvLayer, EnvLayerStack};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("moonframe.yml"), "hemisphere: south").unwrap();
//!
//! let mut env = EnvLayerStack::new();
//! let mut layer = EnvLayer::new("test");
//! layer.set("SAVE_DIR", "cache");
//! env.push(layer);
//!
//! let config = load_config_with_env(temp.path(), None, &env).unwrap();
//! assert_eq!(config.hemisphere.to_string(), "south");
//! assert_eq!(config.save_dir, std::path::PathBuf::from("cache"));
//! ```

pub mod env_file;
pub mod env_layer;
pub mod loader;
pub mod overrides;
pub mod schema;
pub mod validator;

pub use env_file::EnvFileParser;
pub use env_layer::{EnvLayer, EnvLayerStack};
pub use loader::{
    find_config_file, load_config, load_config_file, load_config_with_env, parse_config,
    CONFIG_FILE_NAME,
};
pub use overrides::apply_env_overrides;
pub use schema::{AccountConfig, DownloadConfig, MoonConfig, OverlayConfig};
pub use validator::{validate, validate_config, ValidationError};

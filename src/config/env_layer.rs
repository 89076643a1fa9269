//! Environment variable layering.
//!
//! Variables are looked up through a stack of layers with source
//! tracking, so `moonframe` can report where a setting came from. The
//! usual stack is the `.env` file underneath the process environment.

use std::collections::HashMap;
use std::path::Path;

use super::env_file::EnvFileParser;
use crate::error::Result;

/// One named set of variables.
#[derive(Debug, Clone, Default)]
pub struct EnvLayer {
    /// Variables in this layer.
    pub vars: HashMap<String, String>,
    /// Where the variables came from.
    pub source: String,
}

impl EnvLayer {
    /// Create an empty layer.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            vars: HashMap::new(),
            source: source.into(),
        }
    }

    /// Create a layer from existing variables.
    pub fn from_vars(source: impl Into<String>, vars: HashMap<String, String>) -> Self {
        Self {
            vars,
            source: source.into(),
        }
    }

    /// Snapshot of the process environment.
    pub fn process() -> Self {
        Self::from_vars("environment", std::env::vars().collect())
    }

    /// Add a variable to this layer.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

/// Layered variables. The last layer pushed wins.
///
/// # Example
///
/// ```
/// use moonframe::config::{EnvLayer, EnvLayerStack};
///
/// let mut dotenv = EnvLayer::new(".env");
/// dotenv.set("SAVE_DIR", "cache");
/// dotenv.set("HEMISPHERE", "south");
///
/// let mut process = EnvLayer::new("environment");
/// process.set("SAVE_DIR", "/var/moon");
///
/// let mut stack = EnvLayerStack::new();
/// stack.push(dotenv);
/// stack.push(process);
///
/// assert_eq!(stack.get("SAVE_DIR"), Some("/var/moon"));
/// assert_eq!(stack.source_of("HEMISPHERE"), Some(".env"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvLayerStack {
    layers: Vec<EnvLayer>,
}

impl EnvLayerStack {
    pub fn new() -> Self {
        Self { layers: vec![] }
    }

    /// The standard stack: `<dir>/.env` under the process environment.
    pub fn standard(dir: &Path) -> Result<Self> {
        let dotenv = EnvFileParser::load_optional(&dir.join(".env"))?;
        let mut stack = Self::new();
        stack.push(EnvLayer::from_vars(".env", dotenv));
        stack.push(EnvLayer::process());
        Ok(stack)
    }

    /// Add a layer above every existing one.
    pub fn push(&mut self, layer: EnvLayer) {
        self.layers.push(layer);
    }

    /// Value from the highest layer that defines `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.vars.get(key))
            .map(String::as_str)
    }

    /// Source of the layer that supplies `key`.
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.vars.contains_key(key))
            .map(|layer| layer.source.as_str())
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_layers_override_lower() {
        let mut stack = EnvLayerStack::new();

        let mut base = EnvLayer::new("base");
        base.set("KEY", "base");
        stack.push(base);

        let mut local = EnvLayer::new("local");
        local.set("KEY", "override");
        stack.push(local);

        assert_eq!(stack.get("KEY"), Some("override"));
        assert_eq!(stack.source_of("KEY"), Some("local"));
    }

    #[test]
    fn missing_key_returns_none() {
        let stack = EnvLayerStack::new();
        assert_eq!(stack.get("MISSING"), None);
        assert_eq!(stack.source_of("MISSING"), None);
    }

    #[test]
    fn standard_stack_reads_dotenv_below_process() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".env"),
            "MOONFRAME_TEST_ONLY_IN_DOTENV=dotenv\n",
        )
        .unwrap();

        let stack = EnvLayerStack::standard(temp.path()).unwrap();

        assert_eq!(stack.layer_count(), 2);
        assert_eq!(stack.get("MOONFRAME_TEST_ONLY_IN_DOTENV"), Some("dotenv"));
        assert_eq!(
            stack.source_of("MOONFRAME_TEST_ONLY_IN_DOTENV"),
            Some(".env")
        );
    }

    #[test]
    fn standard_stack_without_dotenv() {
        let temp = tempfile::TempDir::new().unwrap();
        let stack = EnvLayerStack::standard(temp.path()).unwrap();

        assert_eq!(stack.layer_count(), 2);
    }
}

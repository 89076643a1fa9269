//! `.env` file parsing.
//!
//! Credentials and deployment switches are usually kept in a `.env` file
//! next to the service. Values from it sit underneath the real process
//! environment (see [`super::env_layer`]).

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parses `.env` content into variables.
///
/// # Supported Formats
///
/// - `KEY=value`, with optional whitespace around `=`
/// - `export KEY=value`
/// - `KEY="double quoted"` or `KEY='single quoted'`
/// - `KEY=` (empty)
/// - `# comments` and blank lines
///
/// # Example
///
/// ```
/// use moonframe::config::EnvFileParser;
///
/// let vars = EnvFileParser::parse("# keys\nexport CONSUMER_KEY=\"abc\"\nSAVE_DIR=tmp\n");
/// assert_eq!(vars.get("CONSUMER_KEY").map(String::as_str), Some("abc"));
/// assert_eq!(vars.get("SAVE_DIR").map(String::as_str), Some("tmp"));
/// ```
pub struct EnvFileParser;

impl EnvFileParser {
    /// Parse `.env` content. Malformed lines are skipped.
    pub fn parse(content: &str) -> HashMap<String, String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(Self::parse_line)
            .collect()
    }

    fn parse_line(line: &str) -> Option<(String, String)> {
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return None;
        }
        Some((key.to_string(), Self::unquote(value.trim()).to_string()))
    }

    fn unquote(value: &str) -> &str {
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return &value[1..value.len() - 1];
            }
        }
        value
    }

    /// Load a `.env` file, or nothing if it does not exist.
    pub fn load_optional(path: &Path) -> Result<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&content))
    }
}

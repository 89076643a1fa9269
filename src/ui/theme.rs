//! Visual theme and styling.

use console::Style;

/// moonframe's visual theme.
#[derive(Debug, Clone)]
pub struct MoonTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for key labels in key-value displays (bold).
    pub key: Style,
}

impl Default for MoonTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl MoonTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            key: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            key: Style::new(),
        }
    }

    /// Force styling on or off regardless of the terminal.
    pub fn force_styling(mut self, enabled: bool) -> Self {
        for style in [
            &mut self.success,
            &mut self.warning,
            &mut self.error,
            &mut self.key,
        ] {
            *style = style.clone().force_styling(enabled);
        }
        self
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format an aligned `key: value` line.
    pub fn format_key_value(&self, key: &str, value: &str, width: usize) -> String {
        let label = format!("{:width$}", format!("{}:", key), width = width + 1);
        format!("{} {}", self.key.apply_to(label), value)
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::MoonTheme;
use super::SpinnerHandle;

/// A progress spinner for long-running operations such as downloads.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: MoonTheme,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str, theme: MoonTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("🌑🌒🌓🌔🌕🌖🌗🌘 ")
            .template("{spinner} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));

        Self { bar, theme }
    }

    /// Create a spinner that doesn't show (for quiet mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: MoonTheme::plain(),
        }
    }

    fn finish_with(&mut self, line: String) {
        self.bar.set_style(ProgressStyle::default_spinner());
        self.bar.finish_and_clear();
        if !self.bar.is_hidden() {
            eprintln!("{}", line);
        }
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_finishes_silently() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.set_message("Downloading");
        spinner.finish_success("Done");
        assert!(spinner.bar.is_finished());
    }

    #[test]
    fn spinner_lifecycle() {
        let mut spinner = ProgressSpinner::new("Downloading", MoonTheme::plain());
        spinner.set_message("Compositing");
        spinner.finish_error("Failed");
        assert!(spinner.bar.is_finished());
    }

    #[test]
    fn dropped_spinner_is_cleared() {
        let spinner = ProgressSpinner::new("Downloading", MoonTheme::plain());
        let bar = spinner.bar.clone();
        drop(spinner);
        assert!(bar.is_finished());
    }
}

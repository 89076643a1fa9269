//! Terminal user interface.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] capturing output for tests
//! - Spinners and the colour theme
//!
//! Results go to stdout; status, spinners and errors go to stderr, so the
//! output of commands such as `moonframe resolve` can be piped.
//!
//! # Example
//!
//! ```
//! use moonframe::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("tmp/moon_0011.jpg");
//! ui.success("Frame ready");
//!
//! assert!(ui.has_message("tmp/moon_0011.jpg"));
//! assert!(ui.has_success("Frame ready"));
//! ```

pub mod mock;
pub mod output;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, MoonTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Print a result line. Shown in every mode.
    fn message(&mut self, msg: &str);

    /// Print a `key: value` result line. Shown in every mode.
    fn key_value(&mut self, key: &str, value: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);
}

//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, MoonConfig};
use crate::error::{MoonError, Result};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// Failures the user should see as a status (timeout, forbidden) are
    /// reported through `ui` and returned as a failed [`CommandResult`].
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Result matching an envelope status code.
    pub fn for_status(status: u16) -> Self {
        match status {
            200..=299 => Self::success(),
            403 => Self::failure(3),
            408 => Self::failure(4),
            _ => Self::failure(1),
        }
    }

    /// Report `err` and turn it into a failure with its category's exit code.
    pub fn from_error(err: &MoonError, ui: &mut dyn UserInterface) -> Self {
        ui.error(&err.to_string());
        Self::failure(err.category().exit_code())
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given working directory.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Get the working directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load the effective configuration, with relative paths anchored at
    /// the working directory.
    pub fn load_config(&self, config_override: Option<&Path>) -> Result<MoonConfig> {
        let mut config = load_config(&self.project_root, config_override)?;
        config.save_dir = self.project_root.join(&config.save_dir);
        if let Some(path) = config.overlay.path.as_mut() {
            *path = self.project_root.join(&*path);
        }
        Ok(config)
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.load_config(cli.config.as_deref())?;

        match &cli.command {
            Commands::Resolve(args) => {
                super::resolve::ResolveCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Prefetch(args) => {
                super::prefetch::PrefetchCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Picture(args) => {
                super::picture::PictureCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Name(args) => super::name::NameCommand::new(config, args.clone()).execute(ui),
            Commands::Phase(args) => {
                super::phase::PhaseCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Key(args) => super::key::KeyCommand::new(config, args.clone()).execute(ui),
            Commands::Cache(args) => {
                super::cache::CacheCommand::new(config, args.clone()).execute(ui)
            }
        }
    }
}

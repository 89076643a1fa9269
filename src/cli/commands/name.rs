//! Name command implementation.

use crate::cli::args::NameArgs;
use crate::config::MoonConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::picture::{build_service, credentials};

/// The name command implementation.
pub struct NameCommand {
    config: MoonConfig,
    args: NameArgs,
}

impl NameCommand {
    /// Create a new name command.
    pub fn new(config: MoonConfig, args: NameArgs) -> Self {
        Self { config, args }
    }
}

impl Command for NameCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let service = build_service(&self.config)?;

        match service.update_name(&credentials(&self.args.credentials), &self.args.current) {
            Ok(name) => {
                ui.message(&name);
                ui.success("Display name updated");
                Ok(CommandResult::success())
            }
            Err(err) => Ok(CommandResult::from_error(&err, ui)),
        }
    }
}

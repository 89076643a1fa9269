//! Picture command implementation.
//!
//! `moonframe picture` resolves the current frame and uploads it as the
//! account's profile picture, printing the result envelope.

use std::sync::Arc;

use crate::account::{AccountCredentials, HttpAccountUpdater};
use crate::api;
use crate::cli::args::{CredentialArgs, PictureArgs};
use crate::config::MoonConfig;
use crate::error::Result;
use crate::resolver::MoonResolver;
use crate::service::MoonService;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The picture command implementation.
pub struct PictureCommand {
    config: MoonConfig,
    args: PictureArgs,
}

impl PictureCommand {
    /// Create a new picture command.
    pub fn new(config: MoonConfig, args: PictureArgs) -> Self {
        Self { config, args }
    }
}

impl Command for PictureCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let service = build_service(&self.config)?;

        let mut spinner = ui.start_spinner("Updating profile picture");
        let reply = api::picture(&service, &credentials(&self.args.credentials));
        if reply.is_success() {
            spinner.finish_success(&reply.body.message);
        } else {
            spinner.finish_error(&reply.body.message);
        }

        ui.message(&reply.to_json());
        Ok(CommandResult::for_status(reply.status))
    }
}

/// Service over the configured resolver and HTTP account endpoint.
pub(crate) fn build_service(config: &MoonConfig) -> Result<MoonService> {
    let resolver = MoonResolver::from_config(config)?;
    let account = HttpAccountUpdater::from_config(&config.account)?;
    Ok(MoonService::new(Arc::new(resolver), Arc::new(account)))
}

pub(crate) fn credentials(args: &CredentialArgs) -> AccountCredentials {
    AccountCredentials::new(&args.access_token, &args.access_token_secret)
}

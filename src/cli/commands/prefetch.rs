//! Prefetch command implementation.
//!
//! `moonframe prefetch --key <secret>` warms the cache ahead of the hour
//! and prints the result envelope.

use crate::api;
use crate::cli::args::PrefetchArgs;
use crate::config::MoonConfig;
use crate::error::Result;
use crate::resolver::MoonResolver;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The prefetch command implementation.
pub struct PrefetchCommand {
    config: MoonConfig,
    args: PrefetchArgs,
}

impl PrefetchCommand {
    /// Create a new prefetch command.
    pub fn new(config: MoonConfig, args: PrefetchArgs) -> Self {
        Self { config, args }
    }
}

impl Command for PrefetchCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let resolver = MoonResolver::from_config(&self.config)?;

        let mut spinner = ui.start_spinner("Prefetching frame");
        let reply = api::download(
            &resolver,
            &self.args.key,
            self.config.prefetch_secret.as_deref(),
        );
        if reply.is_success() {
            spinner.finish_success(&reply.body.message);
        } else {
            spinner.finish_error(&reply.body.message);
        }

        ui.message(&reply.to_json());
        Ok(CommandResult::for_status(reply.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn config(temp: &TempDir, server: &MockServer, secret: Option<&str>) -> MoonConfig {
        let mut config = MoonConfig::default();
        config.save_dir = temp.path().to_path_buf();
        config.download.url_template = server.url("/moon.{key}.jpg");
        config.prefetch_secret = secret.map(str::to_string);
        config
    }

    fn args(key: &str) -> PrefetchArgs {
        PrefetchArgs {
            key: key.to_string(),
        }
    }

    #[test]
    fn correct_key_downloads() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(200).body("frame");
        });
        let cmd = PrefetchCommand::new(config(&temp, &server, Some("s3cret")), args("s3cret"));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        mock.assert();
        assert!(ui.has_message("\"image downloaded\""));
    }

    #[test]
    fn wrong_key_is_forbidden() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(200).body("frame");
        });
        let cmd = PrefetchCommand::new(config(&temp, &server, Some("s3cret")), args("guess"));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 3);
        mock.assert_calls(0);
        assert!(ui.has_message("wrong key"));
    }

    #[test]
    fn unconfigured_secret_rejects_everything() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        let cmd = PrefetchCommand::new(config(&temp, &server, None), args(""));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 3);
    }
}

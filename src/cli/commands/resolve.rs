//! Resolve command implementation.
//!
//! `moonframe resolve` makes sure the frame for the current hour is cached
//! and prints its path on stdout.

use serde_json::json;

use crate::cli::args::ResolveArgs;
use crate::config::MoonConfig;
use crate::error::Result;
use crate::resolver::{MoonResolver, ResolutionKind};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The resolve command implementation.
pub struct ResolveCommand {
    config: MoonConfig,
    args: ResolveArgs,
}

impl ResolveCommand {
    /// Create a new resolve command.
    pub fn new(config: MoonConfig, args: ResolveArgs) -> Self {
        Self { config, args }
    }
}

impl Command for ResolveCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let resolver = MoonResolver::from_config(&self.config)?;
        let key = resolver.key_at(chrono::Utc::now());

        let mut spinner = ui.start_spinner(&format!("Resolving frame {}", key));
        let resolution = match resolver.resolve() {
            Ok(resolution) => resolution,
            Err(err) => {
                spinner.finish_error("Resolution failed");
                return Ok(CommandResult::from_error(&err, ui));
            }
        };

        match resolution.kind {
            ResolutionKind::CacheHit => spinner.finish_success("Cached"),
            ResolutionKind::Fetched { elapsed, bytes } => spinner.finish_success(&format!(
                "Downloaded {} bytes in {:.2} s",
                bytes,
                elapsed.as_secs_f64()
            )),
        }

        if self.args.json {
            let body = json!({
                "moon_id": resolution.key.to_string(),
                "path": resolution.path,
                "fetched": resolution.fetched(),
            });
            ui.message(&serde_json::to_string_pretty(&body).map_err(anyhow::Error::from)?);
        } else {
            ui.message(&resolution.path.display().to_string());
            ui.success(&format!("Frame {} ready", resolution.key));
        }

        Ok(CommandResult::success())
    }
}

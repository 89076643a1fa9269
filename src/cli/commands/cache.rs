//! Cache command implementation.
//!
//! Provides `moonframe cache status`, `moonframe cache verify` and
//! `moonframe cache clear`.

use chrono::Utc;
use clap::{Args, Subcommand};

use crate::bucket::bucket_key;
use crate::cache::{CacheStore, Verification};
use crate::config::MoonConfig;
use crate::error::Result;
use crate::lease::CacheLease;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// Show the cached frame and whether it is current.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Re-hash cached frames against their metadata.
    Verify,
    /// Remove every cached frame.
    Clear,
}

/// The cache command implementation.
pub struct CacheCommand {
    config: MoonConfig,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(config: MoonConfig, args: CacheArgs) -> Self {
        Self { config, args }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = CacheStore::new(&self.config.save_dir);

        match &self.args.command {
            CacheSubcommand::Status { json } => show_status(&store, &self.config, *json, ui),
            CacheSubcommand::Verify => verify_cache(&store, ui),
            CacheSubcommand::Clear => clear_cache(&store, &self.config, ui),
        }
    }
}

fn show_status(
    store: &CacheStore,
    config: &MoonConfig,
    json: bool,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    let entries = store.list()?;

    if json {
        let output = serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?;
        ui.message(&output);
        return Ok(CommandResult::success());
    }

    ui.key_value("directory", &store.root().display().to_string());

    if entries.is_empty() {
        ui.message("Cache is empty");
        return Ok(CommandResult::success());
    }

    let current = bucket_key(Utc::now(), config.granularity);
    for entry in &entries {
        let state = if entry.bucket_key() == Some(current) {
            "current"
        } else {
            "stale"
        };
        ui.message(&format!(
            "  {} [{}] {} bytes, cached {} ago{}",
            entry.key,
            state,
            entry.metadata.size_bytes,
            format_age(entry.age()),
            if entry.metadata.overlay_applied {
                ", overlay applied"
            } else {
                ""
            }
        ));
    }
    ui.key_value("total", &format!("{} bytes", store.total_size()?));

    Ok(CommandResult::success())
}

fn verify_cache(store: &CacheStore, ui: &mut dyn UserInterface) -> Result<CommandResult> {
    let entries = store.list()?;
    if entries.is_empty() {
        ui.message("Cache is empty");
        return Ok(CommandResult::success());
    }

    let mut bad = 0;
    for entry in &entries {
        let Some(key) = entry.bucket_key() else {
            ui.warning(&format!("Skipping entry with malformed key {:?}", entry.key));
            continue;
        };
        match store.verify(key)? {
            Verification::Valid => ui.success(&format!("{} ok", key)),
            Verification::Mismatch { expected, actual } => {
                bad += 1;
                ui.error(&format!(
                    "{} checksum mismatch: expected {}, found {}",
                    key, expected, actual
                ));
            }
            Verification::Missing => {
                bad += 1;
                ui.error(&format!("{} metadata present but image missing", key));
            }
        }
    }

    Ok(if bad == 0 {
        CommandResult::success()
    } else {
        CommandResult::failure(1)
    })
}

fn clear_cache(
    store: &CacheStore,
    config: &MoonConfig,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    if !store.root().exists() {
        ui.message("Cache is already empty");
        return Ok(CommandResult::success());
    }

    let lease = CacheLease::new(store.root(), config.lease);
    let _guard = lease.acquire_within(config.lease_wait())?;
    let removed = store.clear()?;
    ui.success(&format!("Removed {} files", removed));

    Ok(CommandResult::success())
}

/// Render an age as the largest whole unit.
fn format_age(age: chrono::Duration) -> String {
    let secs = age.num_seconds().max(0);
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86400),
    }
}

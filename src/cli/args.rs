//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::phase::Hemisphere;

use super::commands::cache::CacheArgs;

/// Moonframe - hourly moon images, cached and ready to upload.
#[derive(Debug, Parser)]
#[command(name = "moonframe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ./moonframe.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory for config, .env and the cache (overrides current directory)
    #[arg(short = 'C', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the current frame and print its path
    Resolve(ResolveArgs),

    /// Resolve the current frame ahead of time (guarded by the prefetch secret)
    Prefetch(PrefetchArgs),

    /// Set the current frame as the account's profile picture
    Picture(PictureArgs),

    /// Append today's phase symbol to a display name and apply it
    Name(NameArgs),

    /// Print the moon phase symbol for a date
    Phase(PhaseArgs),

    /// Print the bucket key and frame URL for an instant
    Key(KeyArgs),

    /// Inspect or clear the frame cache
    Cache(CacheArgs),
}

/// Arguments for the `resolve` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResolveArgs {
    /// Print the result envelope as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `prefetch` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PrefetchArgs {
    /// Shared secret; must match `prefetch_secret`
    #[arg(short, long, env = "DOWNLOAD_KEY")]
    pub key: String,
}

/// User credentials for account updates.
#[derive(Debug, Clone, clap::Args)]
pub struct CredentialArgs {
    /// User access token
    #[arg(long, env = "ACCESS_TOKEN")]
    pub access_token: String,

    /// User access token secret
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub access_token_secret: String,
}

/// Arguments for the `picture` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PictureArgs {
    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Arguments for the `name` command.
#[derive(Debug, Clone, clap::Args)]
pub struct NameArgs {
    /// Display name to decorate
    #[arg(long)]
    pub current: String,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Arguments for the `phase` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PhaseArgs {
    /// Date to compute the phase for (YYYY-MM-DD, default today in UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Hemisphere to view from (overrides config)
    #[arg(long)]
    pub hemisphere: Option<Hemisphere>,
}

/// Arguments for the `key` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct KeyArgs {
    /// Instant to compute the key for (RFC 3339, default now)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["moonframe", "resolve", "--quiet", "--config", "m.yml"]);

        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("m.yml")));
        assert!(matches!(cli.command, Commands::Resolve(_)));
    }

    #[test]
    fn parses_phase_date_and_hemisphere() {
        let cli = Cli::parse_from([
            "moonframe",
            "phase",
            "--date",
            "2000-01-11",
            "--hemisphere",
            "south",
        ]);

        let Commands::Phase(args) = cli.command else {
            panic!("expected phase");
        };
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2000, 1, 11));
        assert_eq!(args.hemisphere, Some(Hemisphere::South));
    }

    #[test]
    fn parses_key_instant() {
        let cli = Cli::parse_from(["moonframe", "key", "--at", "2024-01-01T10:00:00Z"]);

        let Commands::Key(args) = cli.command else {
            panic!("expected key");
        };
        assert_eq!(
            args.at.map(|t| t.to_rfc3339()),
            Some("2024-01-01T10:00:00+00:00".to_string())
        );
    }

    #[test]
    fn rejects_bad_date() {
        let result = Cli::try_parse_from(["moonframe", "phase", "--date", "11/01/2000"]);
        assert!(result.is_err());
    }

    #[test]
    fn picture_takes_credentials() {
        let cli = Cli::parse_from([
            "moonframe",
            "picture",
            "--access-token",
            "t",
            "--access-token-secret",
            "s",
        ]);

        let Commands::Picture(args) = cli.command else {
            panic!("expected picture");
        };
        assert_eq!(args.credentials.access_token, "t");
        assert_eq!(args.credentials.access_token_secret, "s");
    }
}

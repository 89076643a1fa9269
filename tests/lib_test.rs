//! Library integration tests.

use moonframe::{ErrorCategory, MoonError};
use std::time::Duration;

#[test]
fn error_types_are_public() {
    let err = MoonError::TimedOut {
        url: "https://frames.test/moon.0001.jpg".into(),
        elapsed: Duration::from_millis(1500),
    };
    assert!(err.to_string().contains("1.50 s"));
    assert_eq!(err.category(), ErrorCategory::Timeout);
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> moonframe::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn categories_have_stable_codes() {
    let cases = [
        (ErrorCategory::Timeout, 408, 4),
        (ErrorCategory::Forbidden, 403, 3),
        (ErrorCategory::Fatal, 500, 1),
    ];
    for (category, status, exit) in cases {
        assert_eq!(category.status_code(), status);
        assert_eq!(category.exit_code(), exit);
    }
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use moonframe::cli::{Cli, Commands};

    let cli = Cli::parse_from(["moonframe", "cache", "status", "--json"]);

    assert!(matches!(cli.command, Commands::Cache(_)));
}

#[test]
fn api_envelope_is_public() {
    let reply = moonframe::api::ping();
    assert_eq!(reply.status, 200);
    assert!(reply.to_json().contains("pong"));
}

//! Integration tests for the moonframe binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const OVERRIDE_VARS: &[&str] = &[
    "HEMISPHERE",
    "SAVE_DIR",
    "WITH_IMAGE_IN_CENTER",
    "CENTER_IMAGE_PATH",
    "DOWNLOAD_TIMEOUT_SECONDS",
    "DOWNLOAD_SECRET_KEY",
    "DOWNLOAD_KEY",
    "INSECURE_TLS_FALLBACK",
    "CONSUMER_KEY",
    "CONSUMER_SECRET",
    "ACCOUNT_ENDPOINT",
    "RUST_LOG",
];

/// The binary run in `dir` with no configuration leaking in from the
/// test environment.
fn moonframe(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("moonframe"));
    cmd.current_dir(dir.path());
    for var in OVERRIDE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn setup_project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("moonframe.yml"), config).unwrap();
    temp
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    moonframe(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hourly moon images"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    moonframe(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    moonframe(&temp).assert().failure();
    Ok(())
}

#[test]
fn phase_for_date() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    moonframe(&temp)
        .args(["phase", "--date", "2000-01-11"])
        .assert()
        .success()
        .stdout("🌒\n");
    Ok(())
}

#[test]
fn phase_hemisphere_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    moonframe(&temp)
        .env("HEMISPHERE", "south")
        .args(["phase", "--date", "2000-01-11"])
        .assert()
        .success()
        .stdout("🌘\n");
    Ok(())
}

#[test]
fn phase_hemisphere_from_dotenv() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join(".env"), "HEMISPHERE=s\n")?;
    moonframe(&temp)
        .args(["phase", "--date", "2000-01-11"])
        .assert()
        .success()
        .stdout("🌘\n");
    Ok(())
}

#[test]
fn key_at_instant() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        "hemisphere: south\ndownload:\n  url_template: \"https://frames.test/{segment}/moon.{key}.jpg\"\n",
    );
    moonframe(&temp)
        .args(["key", "--at", "2024-01-01T10:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0011"))
        .stdout(predicate::str::contains("https://frames.test/5/moon.0011.jpg"));
    Ok(())
}

#[test]
fn cache_status_on_empty_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    moonframe(&temp)
        .args(["cache", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty"));
    Ok(())
}

#[test]
fn invalid_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("overlay:\n  enabled: true\n  scale: 1.5\n");
    moonframe(&temp)
        .args(["cache", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration"));
    Ok(())
}

#[test]
fn missing_explicit_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    moonframe(&temp)
        .args(["--config", "nope.yml", "phase"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn prefetch_without_secret_is_forbidden() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    moonframe(&temp)
        .args(["prefetch", "--key", "anything"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("wrong key"));
    Ok(())
}

#[test]
fn resolve_downloads_then_hits_cache() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("frame-bytes");
    });
    let temp = setup_project(&format!(
        "save_dir: frames\ndownload:\n  url_template: \"{}\"\n",
        server.url("/moon.{key}.jpg")
    ));

    for _ in 0..2 {
        moonframe(&temp)
            .arg("resolve")
            .assert()
            .success()
            .stdout(predicate::str::contains("moon_"));
    }

    mock.assert_calls(1);
    let frames: Vec<_> = fs::read_dir(temp.path().join("frames"))?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "jpg"))
        .collect();
    assert_eq!(frames.len(), 1);
    Ok(())
}

#[test]
fn resolve_timeout_exits_with_timeout_code() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).delay(Duration::from_secs(3)).body("late");
    });
    let temp = setup_project(&format!(
        "download:\n  url_template: \"{}\"\n",
        server.url("/moon.{key}.jpg")
    ));

    moonframe(&temp)
        .env("DOWNLOAD_TIMEOUT_SECONDS", "0.2")
        .arg("resolve")
        .assert()
        .code(4)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("timed out"));
    Ok(())
}

#[test]
fn quiet_resolve_prints_only_path() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("frame-bytes");
    });
    let temp = setup_project(&format!(
        "download:\n  url_template: \"{}\"\n",
        server.url("/moon.{key}.jpg")
    ));

    moonframe(&temp)
        .args(["--quiet", "--no-color", "resolve"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(".jpg\n"))
        .stderr(predicate::str::contains("ready").not());
    Ok(())
}

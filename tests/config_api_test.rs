//! Integration tests for config module public API.

use moonframe::bucket::Granularity;
use moonframe::config::{load_config_with_env, validate, EnvLayer, EnvLayerStack, MoonConfig};
use moonframe::lease::LeaseMode;
use moonframe::phase::Hemisphere;
use moonframe::resolver::MoonResolver;
use moonframe::MoonError;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> EnvLayerStack {
    let mut layer = EnvLayer::new("test");
    for (key, value) in pairs {
        layer.set(*key, *value);
    }
    let mut stack = EnvLayerStack::new();
    stack.push(layer);
    stack
}

#[test]
fn public_api_is_accessible() {
    let config = MoonConfig::default();
    validate(&config).unwrap();
}

#[test]
fn full_config_workflow() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("moonframe.yml"),
        r#"
hemisphere: south
save_dir: frames
granularity: hour
lease: in_process
lease_wait_secs: 2.5
download:
  timeout_secs: 4
  url_template: "https://frames.test/{segment}/moon.{key}.jpg"
"#,
    )
    .unwrap();

    let config = load_config_with_env(temp.path(), None, &EnvLayerStack::new()).unwrap();

    assert_eq!(config.hemisphere, Hemisphere::South);
    assert_eq!(config.granularity, Granularity::Hour);
    assert_eq!(config.lease, LeaseMode::InProcess);
    assert_eq!(config.timeout(), Some(Duration::from_secs(4)));
    assert_eq!(config.lease_wait(), Some(Duration::from_millis(2500)));

    let resolver = MoonResolver::from_config(&config).unwrap();
    assert_eq!(
        resolver.url_for(moonframe::bucket::BucketKey::new(42)),
        "https://frames.test/5/moon.0042.jpg"
    );
}

#[test]
fn environment_overrides_workflow() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("moonframe.yml"),
        "hemisphere: north\ndownload:\n  timeout_secs: 10\n",
    )
    .unwrap();

    let config = load_config_with_env(
        temp.path(),
        None,
        &env(&[
            ("HEMISPHERE", "south"),
            ("DOWNLOAD_TIMEOUT_SECONDS", "not-a-number"),
            ("DOWNLOAD_SECRET_KEY", "s3cret"),
            ("CONSUMER_KEY", "ck"),
        ]),
    )
    .unwrap();

    assert_eq!(config.hemisphere, Hemisphere::South);
    assert_eq!(config.timeout(), None);
    assert_eq!(config.prefetch_secret.as_deref(), Some("s3cret"));
    assert_eq!(config.account.consumer_key.as_deref(), Some("ck"));
}

#[test]
fn enabling_overlay_from_environment_requires_path() {
    let temp = TempDir::new().unwrap();

    let result = load_config_with_env(
        temp.path(),
        None,
        &env(&[("WITH_IMAGE_IN_CENTER", "True")]),
    );

    assert!(matches!(result, Err(MoonError::ConfigValidationError { .. })));
}

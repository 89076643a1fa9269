//! Configuration schema definitions for moonframe.
//!
//! This module contains the struct definitions that map to the
//! `moonframe.yml` file format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::bucket::Granularity;
use crate::composite::OverlaySpec;
use crate::error::{MoonError, Result};
use crate::fetch::{FrameSource, DEFAULT_URL_TEMPLATE};
use crate::lease::LeaseMode;
use crate::phase::Hemisphere;

/// Root configuration structure for moonframe.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    /// Which hemisphere's view of the moon to fetch and label.
    pub hemisphere: Hemisphere,

    /// Cache directory holding the current frame.
    pub save_dir: PathBuf,

    /// How the current time maps to a frame.
    pub granularity: Granularity,

    /// Download settings
    pub download: DownloadConfig,

    /// Overlay compositing
    pub overlay: OverlayConfig,

    /// Cache lease mode
    pub lease: LeaseMode,

    /// Seconds to wait for another resolution before giving up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_wait_secs: Option<f64>,

    /// Shared secret guarding `prefetch`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch_secret: Option<String>,

    /// Account service settings
    pub account: AccountConfig,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            hemisphere: Hemisphere::default(),
            save_dir: default_save_dir(),
            granularity: Granularity::default(),
            download: DownloadConfig::default(),
            overlay: OverlayConfig::default(),
            lease: LeaseMode::default(),
            lease_wait_secs: None,
            prefetch_secret: None,
            account: AccountConfig::default(),
        }
    }
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("tmp")
}

/// Frame download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Deadline for one download, in seconds. Absent means none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,

    /// Retry once without certificate validation after a TLS rejection.
    pub insecure_tls_fallback: bool,

    /// URL with `{segment}` and `{key}` placeholders
    pub url_template: String,

    pub north_segment: String,
    pub south_segment: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        let source = FrameSource::default();
        Self {
            timeout_secs: None,
            insecure_tls_fallback: false,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            north_segment: source.north_segment,
            south_segment: source.south_segment,
        }
    }
}

/// Overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,

    /// Image drawn over the centre of each frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Size factor in (0, 1]
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            scale: default_scale(),
        }
    }
}

fn default_scale() -> f64 {
    0.8
}

/// Account service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Base URL of the account API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_secret: Option<String>,
}

impl MoonConfig {
    /// Download deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.download
            .timeout_secs
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    /// Lease wait bound.
    pub fn lease_wait(&self) -> Option<Duration> {
        self.lease_wait_secs
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    /// Where frames are published.
    pub fn source(&self) -> FrameSource {
        FrameSource {
            url_template: self.download.url_template.clone(),
            north_segment: self.download.north_segment.clone(),
            south_segment: self.download.south_segment.clone(),
        }
    }

    /// The overlay to apply, if enabled.
    pub fn overlay_spec(&self) -> Result<Option<OverlaySpec>> {
        if !self.overlay.enabled {
            return Ok(None);
        }
        let path = self
            .overlay
            .path
            .clone()
            .ok_or_else(|| MoonError::ConfigValidationError {
                message: "overlay.path is required when overlay is enabled".to_string(),
            })?;
        OverlaySpec::new(path, self.overlay.scale).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config: MoonConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.hemisphere, Hemisphere::North);
        assert_eq!(config.save_dir, PathBuf::from("tmp"));
        assert_eq!(config.granularity, Granularity::NearestHour);
        assert_eq!(config.lease, LeaseMode::Advisory);
        assert!(!config.download.insecure_tls_fallback);
        assert!(config.timeout().is_none());
        assert_eq!(config.overlay.scale, 0.8);
        assert_eq!(config.source(), FrameSource::default());
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
hemisphere: south
save_dir: /var/cache/moon
granularity: hour
download:
  timeout_secs: 2.5
  insecure_tls_fallback: true
overlay:
  enabled: true
  path: avatar.png
  scale: 0.5
lease: in_process
lease_wait_secs: 10
prefetch_secret: s3cret
account:
  endpoint: https://api.example.com
"#;
        let config: MoonConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.hemisphere, Hemisphere::South);
        assert_eq!(config.granularity, Granularity::Hour);
        assert_eq!(config.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.lease, LeaseMode::InProcess);
        assert_eq!(config.lease_wait(), Some(Duration::from_secs(10)));
        assert_eq!(config.prefetch_secret.as_deref(), Some("s3cret"));
        let spec = config.overlay_spec().unwrap().unwrap();
        assert_eq!(spec.path, PathBuf::from("avatar.png"));
        assert_eq!(spec.scale, 0.5);
    }

    #[test]
    fn disabled_overlay_has_no_spec() {
        let config = MoonConfig::default();
        assert!(config.overlay_spec().unwrap().is_none());
    }

    #[test]
    fn enabled_overlay_without_path_is_invalid() {
        let mut config = MoonConfig::default();
        config.overlay.enabled = true;

        assert!(matches!(
            config.overlay_spec(),
            Err(MoonError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn custom_template_flows_into_source() {
        let yaml = "download:\n  url_template: http://mirror/{segment}/{key}.jpg\n  north_segment: n\n";
        let config: MoonConfig = serde_yaml::from_str(yaml).unwrap();

        let source = config.source();
        assert_eq!(source.url_template, "http://mirror/{segment}/{key}.jpg");
        assert_eq!(source.north_segment, "n");
        assert_eq!(source.south_segment, "5");
    }
}

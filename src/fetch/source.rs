//! Frame URL templates.

use serde::{Deserialize, Serialize};

use crate::bucket::BucketKey;
use crate::phase::Hemisphere;

/// Default template for the NASA SVS hourly moon frame sequence.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://svs.gsfc.nasa.gov/vis/a000000/a005400/a00541{segment}/frames/730x730_1x1_30p/moon.{key}.jpg";

/// Where frames are published.
///
/// `{segment}` is replaced with the hemisphere's path segment and `{key}`
/// with the bucket key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSource {
    /// URL with `{segment}` and `{key}` placeholders.
    pub url_template: String,
    /// Segment used for the northern hemisphere.
    pub north_segment: String,
    /// Segment used for the southern hemisphere.
    pub south_segment: String,
}

impl Default for FrameSource {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            north_segment: "6".to_string(),
            south_segment: "5".to_string(),
        }
    }
}

impl FrameSource {
    /// Create a source from a template, with the default segments.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            ..Self::default()
        }
    }

    /// URL of the frame for `key` as seen from `hemisphere`.
    pub fn url_for(&self, hemisphere: Hemisphere, key: BucketKey) -> String {
        let segment = match hemisphere {
            Hemisphere::North => &self.north_segment,
            Hemisphere::South => &self.south_segment,
        };
        self.url_template
            .replace("{segment}", segment)
            .replace("{key}", &key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_source_selects_hemisphere_segment() {
        let source = FrameSource::default();

        assert_eq!(
            source.url_for(Hemisphere::North, BucketKey::new(5)),
            "https://svs.gsfc.nasa.gov/vis/a000000/a005400/a005416/frames/730x730_1x1_30p/moon.0005.jpg"
        );
        assert_eq!(
            source.url_for(Hemisphere::South, BucketKey::new(5)),
            "https://svs.gsfc.nasa.gov/vis/a000000/a005400/a005415/frames/730x730_1x1_30p/moon.0005.jpg"
        );
    }

    #[test]
    fn custom_template_without_segment() {
        let source = FrameSource::new("http://localhost/frames/{key}.jpg");

        assert_eq!(
            source.url_for(Hemisphere::South, BucketKey::new(1234)),
            "http://localhost/frames/1234.jpg"
        );
    }
}

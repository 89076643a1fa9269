//! Cache entry and metadata types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::bucket::BucketKey;

/// The single frame held in the cache directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Bucket key the frame belongs to, as printed in the file name.
    pub key: String,
    /// Path to the cached image.
    pub content_path: PathBuf,
    /// Validation metadata.
    pub metadata: CacheMetadata,
}

/// Metadata written next to the image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When the frame was committed.
    pub cached_at: DateTime<Utc>,
    /// Hex SHA-256 of the committed bytes.
    pub sha256: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Whether the overlay has already been composited into the image.
    pub overlay_applied: bool,
}

impl CacheEntry {
    /// Create a new cache entry.
    pub fn new(key: BucketKey, content_path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.to_string(),
            content_path: content_path.into(),
            metadata: CacheMetadata {
                cached_at: Utc::now(),
                sha256: String::new(),
                size_bytes: 0,
                overlay_applied: false,
            },
        }
    }

    /// Set checksum and size.
    pub fn with_digest(mut self, sha256: impl Into<String>, size: u64) -> Self {
        self.metadata.sha256 = sha256.into();
        self.metadata.size_bytes = size;
        self
    }

    /// Record that the overlay was applied.
    pub fn with_overlay_applied(mut self, applied: bool) -> Self {
        self.metadata.overlay_applied = applied;
        self
    }

    /// Parsed bucket key, if the stored key is well-formed.
    pub fn bucket_key(&self) -> Option<BucketKey> {
        self.key.parse().ok()
    }

    /// Get the age of this entry.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.metadata.cached_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_entry_creation() {
        let entry = CacheEntry::new(BucketKey::new(7), "/tmp/moon_0007.jpg");

        assert_eq!(entry.key, "0007");
        assert_eq!(entry.bucket_key(), Some(BucketKey::new(7)));
        assert!(!entry.metadata.overlay_applied);
    }

    #[test]
    fn cache_entry_with_digest() {
        let entry = CacheEntry::new(BucketKey::new(1), "/tmp/x").with_digest("abc", 1024);

        assert_eq!(entry.metadata.sha256, "abc");
        assert_eq!(entry.metadata.size_bytes, 1024);
    }

    #[test]
    fn cache_entry_round_trips_through_json() {
        let entry = CacheEntry::new(BucketKey::new(12), "/tmp/moon_0012.jpg")
            .with_digest("deadbeef", 3)
            .with_overlay_applied(true);

        let json = serde_json::to_string(&entry).unwrap();
        let back: CacheEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(back.key, "0012");
        assert!(back.metadata.overlay_applied);
        assert_eq!(back.metadata.sha256, "deadbeef");
    }

    #[test]
    fn cache_entry_age() {
        let entry = CacheEntry::new(BucketKey::new(1), "/tmp/x");

        assert!(entry.age().num_seconds() < 1);
    }
}

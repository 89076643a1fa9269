//! Cache storage implementation.
//!
//! The cache directory holds at most one frame: `moon_<key>.jpg` plus its
//! `moon_<key>.meta.json` sidecar. New content is written to a hidden
//! staging file in the same directory and renamed into place, so
//! [`CacheStore::lookup`] never sees a partial image.

use anyhow::Context;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::entry::CacheEntry;
use crate::bucket::{BucketKey, KEY_WIDTH};
use crate::error::Result;

const ENTRY_PREFIX: &str = "moon_";
const STAGING_PREFIX: &str = ".moon-staging-";
const STAGING_SUFFIX: &str = ".part";
const DIGEST_CHUNK: usize = 64 * 1024;

/// Storage for the current frame.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Root directory for cache.
    root: PathBuf,
}

/// Content being downloaded for a key, not yet visible to readers.
///
/// Dropping a staged entry without committing it deletes the file.
#[derive(Debug)]
pub struct StagedEntry {
    key: BucketKey,
    file: NamedTempFile,
}

impl StagedEntry {
    /// Key this content is staged for.
    pub fn key(&self) -> BucketKey {
        self.key
    }

    /// Path of the staging file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Writable handle to the staging file.
    pub fn as_file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }
}

/// What an eviction pass did.
#[derive(Debug, Default)]
pub struct EvictionReport {
    /// Files that were removed.
    pub removed: Vec<PathBuf>,
    /// Files that could not be removed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Outcome of re-checking a cached frame against its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Checksum and size match.
    Valid,
    /// The image on disk differs from what was committed.
    Mismatch { expected: String, actual: String },
    /// No entry for this key.
    Missing,
}

impl CacheStore {
    /// Create a new cache store.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the cache directory exists.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create cache directory {:?}", self.root))?;
        Ok(())
    }

    /// Canonical image path for a key.
    pub fn content_path(&self, key: BucketKey) -> PathBuf {
        self.root.join(format!("{}{}.jpg", ENTRY_PREFIX, key))
    }

    /// Metadata file path for a key.
    fn metadata_path(&self, key: BucketKey) -> PathBuf {
        self.root.join(format!("{}{}.meta.json", ENTRY_PREFIX, key))
    }

    /// Path of the image for `key`, if it has been committed.
    pub fn lookup(&self, key: BucketKey) -> Option<PathBuf> {
        let path = self.content_path(key);
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// Load the metadata committed with `key`.
    pub fn load(&self, key: BucketKey) -> Result<Option<CacheEntry>> {
        let meta_path = self.metadata_path(key);

        if !meta_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&meta_path)?;
        let entry: CacheEntry = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt cache metadata at {:?}", meta_path))?;

        Ok(Some(entry))
    }

    /// Remove every entry that does not belong to `key`, plus leftover
    /// staging files.
    ///
    /// Best effort: files that cannot be removed are logged and reported,
    /// never returned as an error.
    pub fn evict_except(&self, key: BucketKey) -> Result<EvictionReport> {
        self.ensure_dir()?;
        let keep = key.to_string();
        let mut report = EvictionReport::default();

        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable cache entry: {}", e);
                    continue;
                }
            };
            let name = dir_entry.file_name();
            let Some(name) = name.to_str() else { continue };

            let stale = if let Some(rest) = name.strip_prefix(ENTRY_PREFIX) {
                rest.get(..KEY_WIDTH) != Some(keep.as_str())
            } else {
                name.starts_with(STAGING_PREFIX) && name.ends_with(STAGING_SUFFIX)
            };
            if !stale {
                continue;
            }

            let path = dir_entry.path();
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Evicted {:?}", path);
                    report.removed.push(path);
                }
                Err(e) => {
                    warn!("Failed to evict {:?}: {}", path, e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Open a staging file for `key` inside the cache directory.
    pub fn stage(&self, key: BucketKey) -> Result<StagedEntry> {
        self.ensure_dir()?;
        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.root)
            .with_context(|| format!("Failed to create staging file in {:?}", self.root))?;
        Ok(StagedEntry { key, file })
    }

    /// Publish staged content under the canonical path for its key.
    ///
    /// The metadata sidecar is written first, then the image becomes
    /// visible in a single rename. A frame is never visible without its
    /// sidecar.
    pub fn commit(&self, mut staged: StagedEntry, overlay_applied: bool) -> Result<CacheEntry> {
        staged.as_file_mut().sync_all()?;
        let (sha256, size) = digest_file(staged.path())?;

        let key = staged.key;
        let content_path = self.content_path(key);
        let entry = CacheEntry::new(key, &content_path)
            .with_digest(sha256, size)
            .with_overlay_applied(overlay_applied);
        self.save_metadata(&entry, key)?;

        if let Err(e) = staged.file.persist(&content_path) {
            let meta_path = self.metadata_path(key);
            if let Err(cleanup) = fs::remove_file(&meta_path) {
                warn!("Failed to remove {:?}: {}", meta_path, cleanup);
            }
            return Err(anyhow::Error::from(std::io::Error::from(e))
                .context(format!("Failed to publish {:?}", content_path))
                .into());
        }

        debug!("Committed {:?} ({} bytes)", content_path, size);
        Ok(entry)
    }

    /// Write metadata through a staging file and rename.
    fn save_metadata(&self, entry: &CacheEntry, key: BucketKey) -> Result<()> {
        let meta_path = self.metadata_path(key);
        let json = serde_json::to_string_pretty(entry).context("Failed to encode metadata")?;

        let mut tmp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.root)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&meta_path)
            .map_err(std::io::Error::from)
            .with_context(|| format!("Failed to write {:?}", meta_path))?;
        Ok(())
    }

    /// Re-hash the cached image for `key` and compare with its metadata.
    pub fn verify(&self, key: BucketKey) -> Result<Verification> {
        let (Some(entry), Some(path)) = (self.load(key)?, self.lookup(key)) else {
            return Ok(Verification::Missing);
        };

        let (actual, size) = digest_file(&path)?;
        if actual == entry.metadata.sha256 && size == entry.metadata.size_bytes {
            Ok(Verification::Valid)
        } else {
            Ok(Verification::Mismatch {
                expected: entry.metadata.sha256,
                actual,
            })
        }
    }

    /// List committed entries, newest first.
    pub fn list(&self) -> Result<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            let is_meta = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(ENTRY_PREFIX) && n.ends_with(".meta.json"));

            if is_meta {
                if let Ok(json) = fs::read_to_string(&path) {
                    if let Ok(cache_entry) = serde_json::from_str::<CacheEntry>(&json) {
                        entries.push(cache_entry);
                    }
                }
            }
        }

        entries.sort_by(|a, b| b.metadata.cached_at.cmp(&a.metadata.cached_at));
        Ok(entries)
    }

    /// Remove every cached file. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            let ours = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(ENTRY_PREFIX) || n.starts_with(STAGING_PREFIX));
            if ours && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Get total cache size in bytes.
    pub fn total_size(&self) -> Result<u64> {
        let entries = self.list()?;
        Ok(entries.iter().map(|e| e.metadata.size_bytes).sum())
    }
}

/// SHA-256 and size of a file, read in chunks.
fn digest_file(path: &Path) -> Result<(String, u64)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; DIGEST_CHUNK];
    let mut size = 0u64;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    Ok((hex::encode(&hasher.finalize()[..]), size))
}

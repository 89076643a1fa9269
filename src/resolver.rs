//! Single-flight frame resolution.
//!
//! [`MoonResolver`] turns "now" into a local file holding the current frame.
//! The whole pipeline (lookup, evict, fetch, composite, commit) runs under a
//! [`CacheLease`] scoped to the cache directory, so concurrent callers for
//! the same bucket collapse into one download: the first caller fetches,
//! the others wait for the lease and then find the committed entry.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::bucket::{bucket_key, BucketKey, Granularity};
use crate::cache::CacheStore;
use crate::composite::Compositor;
use crate::config::MoonConfig;
use crate::error::Result;
use crate::fetch::{FrameSource, ResourceFetcher};
use crate::lease::{CacheLease, LeaseMode};
use crate::phase::Hemisphere;

/// A resolved frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Bucket the frame belongs to.
    pub key: BucketKey,
    /// Committed file in the cache directory.
    pub path: PathBuf,
    /// How the frame was obtained.
    pub kind: ResolutionKind,
}

/// Whether a resolution hit the cache or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionKind {
    /// The frame was already committed.
    CacheHit,
    /// This call downloaded (and, if configured, composited) the frame.
    Fetched {
        /// Measured download time.
        elapsed: Duration,
        /// Downloaded size.
        bytes: u64,
    },
}

impl Resolution {
    /// Whether this call performed the download.
    pub fn fetched(&self) -> bool {
        matches!(self.kind, ResolutionKind::Fetched { .. })
    }
}

/// Resolves the current frame for one cache directory.
pub struct MoonResolver {
    store: CacheStore,
    fetcher: ResourceFetcher,
    source: FrameSource,
    compositor: Option<Compositor>,
    hemisphere: Hemisphere,
    granularity: Granularity,
    timeout: Option<Duration>,
    lease: Arc<CacheLease>,
    lease_wait: Option<Duration>,
}

impl MoonResolver {
    /// Create a resolver over `store` with default source, hemisphere and
    /// granularity, no overlay and no deadlines.
    pub fn new(store: CacheStore, fetcher: ResourceFetcher, lease: Arc<CacheLease>) -> Self {
        Self {
            store,
            fetcher,
            source: FrameSource::default(),
            compositor: None,
            hemisphere: Hemisphere::default(),
            granularity: Granularity::default(),
            timeout: None,
            lease,
            lease_wait: None,
        }
    }

    /// Create a resolver with its own lease over the store's directory.
    pub fn standalone(store: CacheStore, fetcher: ResourceFetcher, mode: LeaseMode) -> Self {
        let lease = Arc::new(CacheLease::new(store.root(), mode));
        Self::new(store, fetcher, lease)
    }

    /// Build a resolver from configuration, loading the overlay image if
    /// one is enabled.
    pub fn from_config(config: &MoonConfig) -> Result<Self> {
        let compositor = config.overlay_spec()?.map(Compositor::load).transpose()?;
        let fetcher = ResourceFetcher::new(config.download.insecure_tls_fallback)?;
        Ok(
            Self::standalone(CacheStore::new(&config.save_dir), fetcher, config.lease)
                .with_source(config.source())
                .with_compositor(compositor)
                .with_hemisphere(config.hemisphere)
                .with_granularity(config.granularity)
                .with_timeout(config.timeout())
                .with_lease_wait(config.lease_wait()),
        )
    }

    pub fn with_source(mut self, source: FrameSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_compositor(mut self, compositor: Option<Compositor>) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn with_hemisphere(mut self, hemisphere: Hemisphere) -> Self {
        self.hemisphere = hemisphere;
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Deadline for each download. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// How long to wait for another caller's resolution. `None` waits
    /// indefinitely.
    pub fn with_lease_wait(mut self, wait: Option<Duration>) -> Self {
        self.lease_wait = wait;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn lease(&self) -> &Arc<CacheLease> {
        &self.lease
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Bucket key for `now`.
    pub fn key_at(&self, now: DateTime<Utc>) -> BucketKey {
        bucket_key(now, self.granularity)
    }

    /// Frame URL for `key`.
    pub fn url_for(&self, key: BucketKey) -> String {
        self.source.url_for(self.hemisphere, key)
    }

    /// Resolve the frame for the current instant.
    pub fn resolve(&self) -> Result<Resolution> {
        self.resolve_at(Utc::now())
    }

    /// Resolve the frame for `now`.
    ///
    /// On a miss, stale entries are evicted, the frame is downloaded into a
    /// staging file, composited if an overlay is configured, and published
    /// atomically. Any failure discards the staging file; nothing partial is
    /// ever visible under the canonical path.
    pub fn resolve_at(&self, now: DateTime<Utc>) -> Result<Resolution> {
        let key = self.key_at(now);
        let _lease = self.lease.acquire_within(self.lease_wait)?;

        if let Some(path) = self.store.lookup(key) {
            debug!("Cache hit for {}", key);
            return Ok(Resolution {
                key,
                path,
                kind: ResolutionKind::CacheHit,
            });
        }

        debug!("Cache miss for {}", key);
        let evicted = self.store.evict_except(key)?;
        if !evicted.failed.is_empty() {
            debug!("{} stale entries could not be evicted", evicted.failed.len());
        }

        let url = self.url_for(key);
        let mut staged = self.store.stage(key)?;
        let report = self
            .fetcher
            .fetch(&url, self.timeout, staged.as_file_mut())?;
        info!(
            "Downloaded frame {} ({} bytes) in {:.2} s",
            key,
            report.bytes,
            report.elapsed.as_secs_f64()
        );

        let overlay_applied = match &self.compositor {
            Some(compositor) => {
                compositor.overlay(staged.path())?;
                true
            }
            None => false,
        };

        let entry = self.store.commit(staged, overlay_applied)?;
        Ok(Resolution {
            key,
            path: entry.content_path,
            kind: ResolutionKind::Fetched {
                elapsed: report.elapsed,
                bytes: report.bytes,
            },
        })
    }
}

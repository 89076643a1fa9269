//! Moonframe - hourly moon images, cached and ready to upload.
//!
//! Moonframe resolves "the moon image for right now": it maps the current
//! instant to an hour bucket, downloads that hour's frame once, optionally
//! composites an overlay into it, and keeps exactly one frame on disk.
//! Concurrent callers share a single download through a cache lease.
//!
//! # Modules
//!
//! - [`bucket`] - Time-bucket keys
//! - [`cache`] - On-disk frame cache with atomic commits
//! - [`fetch`] - HTTP downloads with deadlines and TLS fallback
//! - [`composite`] - Overlay compositing
//! - [`lease`] - Single-flight lease over a cache directory
//! - [`resolver`] - Cache-or-fetch resolution of the current frame
//! - [`phase`] - Moon phase symbols
//! - [`account`] - Profile picture and display name updates
//! - [`service`] - Resolution plus account updates
//! - [`api`] - Status/envelope translation for remote callers
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Error types and result aliases
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use moonframe::bucket::{bucket_key, Granularity};
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
//! assert_eq!(bucket_key(now, Granularity::Hour).to_string(), "0011");
//! ```
//!
//! For end-to-end resolution against a mock server, see the integration
//! tests.

pub mod account;
pub mod api;
pub mod bucket;
pub mod cache;
pub mod cli;
pub mod composite;
pub mod config;
pub mod error;
pub mod fetch;
pub mod lease;
pub mod phase;
pub mod resolver;
pub mod service;
pub mod ui;

pub use error::{ErrorCategory, MoonError, Result};

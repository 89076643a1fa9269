//! Error types for moonframe operations.
//!
//! This module defines [`MoonError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `MoonError` for failures a caller has to tell apart (timeout vs. fatal)
//! - Use `anyhow::Error` (via `MoonError::Other`) for unexpected errors
//! - Every variant maps to a stable [`ErrorCategory`] and HTTP-style status

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for moonframe operations.
#[derive(Debug, Error)]
pub enum MoonError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The download exceeded its deadline. `elapsed` is the measured time.
    #[error("request to {url} timed out after {:.2} s", elapsed.as_secs_f64())]
    TimedOut { url: String, elapsed: Duration },

    /// The server certificate was rejected and no insecure retry was allowed
    /// (or the retry failed the same way).
    #[error("certificate validation failed for {url}: {message}")]
    CertificateRejected { url: String, message: String },

    /// Connection, protocol or body-read failure.
    #[error("failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// Overlay compositing failed; the base image is not returned.
    #[error("failed to composite overlay onto {path}: {message}")]
    CompositeFailed { path: PathBuf, message: String },

    /// Gave up waiting for another caller's resolution to finish.
    #[error("cache lease not acquired after {:.2} s", waited.as_secs_f64())]
    LeaseUnavailable { waited: Duration },

    /// The account service rejected an update.
    #[error("account update failed with status {status}: {}", errors.join("; "))]
    AccountUpdate { status: u16, errors: Vec<String> },

    /// Wrong shared secret for a guarded operation.
    #[error("forbidden: wrong key")]
    Forbidden,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable failure classes exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Try again later.
    Timeout,
    /// Bad credentials for a guarded operation.
    Forbidden,
    /// Anything else.
    Fatal,
}

impl ErrorCategory {
    /// HTTP status code for this category.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Timeout => 408,
            Self::Forbidden => 403,
            Self::Fatal => 500,
        }
    }

    /// Process exit code for this category.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Timeout => 4,
            Self::Forbidden => 3,
            Self::Fatal => 1,
        }
    }
}

impl MoonError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TimedOut { .. } => ErrorCategory::Timeout,
            Self::Forbidden => ErrorCategory::Forbidden,
            _ => ErrorCategory::Fatal,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        self.category().status_code()
    }
}

/// Result type alias for moonframe operations.
pub type Result<T> = std::result::Result<T, MoonError>;

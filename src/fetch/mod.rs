//! Frame fetching from the remote publisher.
//!
//! This module provides the URL template for published frames and the
//! streaming HTTP fetcher.

pub mod http;
pub mod source;

pub use http::{is_certificate_error, FetchReport, ResourceFetcher, CHUNK_SIZE};
pub use source::{FrameSource, DEFAULT_URL_TEMPLATE};

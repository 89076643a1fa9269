//! HTTP frame fetching.
//!
//! Streams a response body into a caller-supplied writer in bounded chunks.
//! A request whose certificate is rejected may be retried once with
//! validation disabled when the fetcher was built with the insecure
//! fallback enabled. Timeouts are reported with the measured elapsed time.

use reqwest::blocking::{Client, Response};
use std::error::Error as StdError;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{MoonError, Result};

/// Size of each body chunk copied to the destination.
pub const CHUNK_SIZE: usize = 100 * 1024;

/// Fetches frames over HTTP/HTTPS.
pub struct ResourceFetcher {
    client: Client,
    insecure: Option<Client>,
}

/// What a successful fetch produced.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Bytes written to the destination.
    pub bytes: u64,
    /// Wall time from first attempt to last byte.
    pub elapsed: Duration,
    /// Whether certificate validation was disabled for the final attempt.
    pub insecure: bool,
}

impl ResourceFetcher {
    /// Create a fetcher. With `insecure_fallback`, a certificate rejection
    /// is retried once without validation.
    pub fn new(insecure_fallback: bool) -> Result<Self> {
        let insecure = if insecure_fallback {
            Some(build_client(true)?)
        } else {
            None
        };
        Ok(Self {
            client: build_client(false)?,
            insecure,
        })
    }

    /// Whether the insecure retry is enabled.
    pub fn insecure_fallback(&self) -> bool {
        self.insecure.is_some()
    }

    /// Download `url` into `dest`.
    ///
    /// `timeout` bounds the whole exchange, including the insecure retry and
    /// the body transfer. `None` means no deadline.
    pub fn fetch(
        &self,
        url: &str,
        timeout: Option<Duration>,
        dest: &mut dyn Write,
    ) -> Result<FetchReport> {
        let started = Instant::now();

        let (response, insecure) = match self.send(&self.client, url, timeout, started) {
            Ok(response) => (response, false),
            Err(err) if is_certificate_error(&err) => {
                let Some(insecure_client) = &self.insecure else {
                    return Err(MoonError::CertificateRejected {
                        url: url.to_string(),
                        message: error_chain(&err),
                    });
                };
                if deadline_passed(started, timeout) {
                    return Err(timed_out(url, started));
                }
                warn!(
                    "Certificate validation failed for {}, retrying without verification",
                    url
                );
                let remaining = timeout.map(|t| t.saturating_sub(started.elapsed()));
                match self.send(insecure_client, url, remaining, started) {
                    Ok(response) => (response, true),
                    Err(err) => return Err(classify(url, err, started)),
                }
            }
            Err(err) => return Err(classify(url, err, started)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(MoonError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = match copy_chunked(response, dest) {
            Ok(bytes) => bytes,
            Err(e) if is_timeout_io(&e) => return Err(timed_out(url, started)),
            Err(e) => {
                return Err(MoonError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        };

        if deadline_passed(started, timeout) {
            return Err(timed_out(url, started));
        }

        let elapsed = started.elapsed();
        debug!("Fetched {} ({} bytes in {:.2?})", url, bytes, elapsed);
        Ok(FetchReport {
            bytes,
            elapsed,
            insecure,
        })
    }

    fn send(
        &self,
        client: &Client,
        url: &str,
        timeout: Option<Duration>,
        started: Instant,
    ) -> std::result::Result<Response, reqwest::Error> {
        let mut request = client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        debug!("GET {} (t+{:.2?})", url, started.elapsed());
        request.send()
    }
}

fn build_client(accept_invalid_certs: bool) -> Result<Client> {
    Client::builder()
        .user_agent(concat!("moonframe/", env!("CARGO_PKG_VERSION")))
        .timeout(None::<Duration>)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| MoonError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))
}

fn copy_chunked(mut response: Response, dest: &mut dyn Write) -> io::Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = match response.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dest.write_all(&buf[..n])?;
        total += n as u64;
    }
    dest.flush()?;
    Ok(total)
}

fn deadline_passed(started: Instant, timeout: Option<Duration>) -> bool {
    timeout.is_some_and(|t| started.elapsed() > t)
}

fn timed_out(url: &str, started: Instant) -> MoonError {
    MoonError::TimedOut {
        url: url.to_string(),
        elapsed: started.elapsed(),
    }
}

fn classify(url: &str, err: reqwest::Error, started: Instant) -> MoonError {
    if err.is_timeout() {
        timed_out(url, started)
    } else if is_certificate_error(&err) {
        MoonError::CertificateRejected {
            url: url.to_string(),
            message: error_chain(&err),
        }
    } else {
        MoonError::Transport {
            url: url.to_string(),
            message: error_chain(&err),
        }
    }
}

/// Display prefix of rustls's `Error::InvalidCertificate`.
const INVALID_CERTIFICATE: &str = "invalid peer certificate";

/// Whether an error chain was caused by the peer certificate being rejected.
///
/// reqwest does not expose its rustls error type, and the rustls error
/// reaches us inside an `io::Error` whose `source()` skips it, so a
/// downcast cannot find it. Only its rendered text is visible.
pub fn is_certificate_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if e.to_string().contains(INVALID_CERTIFICATE) {
            return true;
        }
        current = e.source();
    }
    false
}

fn is_timeout_io(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::TimedOut {
        return true;
    }
    let mut current = err.get_ref().map(|e| e as &(dyn StdError + 'static));
    while let Some(e) = current {
        if let Some(req) = e.downcast_ref::<reqwest::Error>() {
            if req.is_timeout() {
                return true;
            }
        }
        if let Some(io) = e.downcast_ref::<io::Error>() {
            if io.kind() == io::ErrorKind::TimedOut {
                return true;
            }
        }
        current = e.source();
    }
    false
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let text = e.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}

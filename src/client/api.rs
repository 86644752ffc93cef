//! HTTP client for the feed backend.
//!
//! One [`ApiClient`] is built at startup and cloned into background tasks.
//! Page fetches retry transient failures with exponential backoff; media
//! fetches do not retry here because the media cache re-resolves failed
//! entries on the next request, and a second retry layer would stretch that
//! contract invisibly.

use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::decode;
use crate::feed::model::FeedPage;

/// Per-request deadline for feed page and logout requests.
const PAGE_TIMEOUT: Duration = Duration::from_secs(20);
/// Per-request deadline for media blob requests.
const MEDIA_TIMEOUT: Duration = Duration::from_secs(30);
/// Maximum feed response body size.
const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024; // 2MB
/// Maximum media blob size.
const MAX_MEDIA_BYTES: usize = 8 * 1024 * 1024; // 8MB
/// Retry budget for transient page-fetch failures.
const MAX_RETRIES: u32 = 3;

/// Errors from feed page fetches and session operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport-level failure (DNS, connect, TLS, mid-body disconnect)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend returned a non-success status
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// Request exceeded its deadline
    #[error("Request timed out after 20s")]
    Timeout,

    /// Backend kept returning 429 until the retry budget ran out
    #[error("Rate limited by backend (gave up after {0} retries)")]
    RateLimited(u32),

    /// Response body was not the expected JSON envelope
    #[error("Malformed feed response: {0}")]
    Decode(String),

    /// Response exceeded the size limit
    #[error("Response too large (exceeds {MAX_PAGE_BYTES} bytes)")]
    ResponseTooLarge,

    /// Body ended before the advertised Content-Length
    #[error("Incomplete response: expected {expected} bytes, got {received}")]
    IncompleteResponse { expected: u64, received: usize },

    /// Configured base URL did not parse
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Configured base URL is plain HTTP on a non-loopback host
    #[error("Insecure base URL: HTTPS required (except loopback for testing)")]
    InsecureBaseUrl,
}

impl FeedError {
    /// True when the request should be retried after backoff.
    fn is_retryable(&self) -> bool {
        match self {
            FeedError::Network(_) | FeedError::Timeout => true,
            FeedError::HttpStatus(status) => *status == 429 || *status >= 500,
            FeedError::IncompleteResponse { .. } => true,
            FeedError::RateLimited(_)
            | FeedError::Decode(_)
            | FeedError::ResponseTooLarge
            | FeedError::InvalidBaseUrl(_)
            | FeedError::InsecureBaseUrl => false,
        }
    }
}

/// Errors from media blob fetches.
///
/// Clone-able so a single failure can fan out to every waiter attached to
/// the in-flight fetch; the transport error is carried as its message.
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Network(String),

    /// Backend returned a non-success status
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// Request exceeded its deadline
    #[error("Request timed out after 30s")]
    Timeout,

    /// Blob exceeded the size limit
    #[error("Media too large (exceeds {MAX_MEDIA_BYTES} bytes)")]
    TooLarge,

    /// Body ended before the advertised Content-Length
    #[error("Incomplete response: expected {expected} bytes, got {received}")]
    Incomplete { expected: u64, received: usize },

    /// The fetch task went away without delivering a result
    #[error("Media fetch interrupted")]
    Interrupted,
}

/// Failure modes of a size-limited body read, mapped into the caller's
/// error type at the edge.
enum BodyError {
    Network(reqwest::Error),
    TooLarge,
    Incomplete { expected: u64, received: usize },
}

impl From<BodyError> for FeedError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::Network(e) => FeedError::Network(e),
            BodyError::TooLarge => FeedError::ResponseTooLarge,
            BodyError::Incomplete { expected, received } => {
                FeedError::IncompleteResponse { expected, received }
            }
        }
    }
}

impl From<BodyError> for MediaError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::Network(e) => MediaError::Network(e.to_string()),
            BodyError::TooLarge => MediaError::TooLarge,
            BodyError::Incomplete { expected, received } => {
                MediaError::Incomplete { expected, received }
            }
        }
    }
}

/// HTTP client for the feed backend. Cheap to clone; every spawned task
/// takes its own copy.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    /// Base URL with any trailing slash removed.
    base: Arc<str>,
    session_token: Option<Arc<SecretString>>,
}

impl ApiClient {
    /// Build a client for the given backend.
    ///
    /// The base URL must be HTTPS; plain HTTP is allowed only for loopback
    /// hosts so tests and local backends keep working.
    pub fn new(base_url: &str, session_token: Option<SecretString>) -> Result<Self, FeedError> {
        let base = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(base).map_err(|e| FeedError::InvalidBaseUrl(e.to_string()))?;

        match parsed.scheme() {
            "https" => {}
            "http" => {
                let loopback = match parsed.host() {
                    Some(url::Host::Domain(domain)) => domain == "localhost",
                    Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
                    Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
                    None => false,
                };
                if !loopback {
                    tracing::error!(base_url = %base, "Rejecting non-HTTPS base URL");
                    return Err(FeedError::InsecureBaseUrl);
                }
                tracing::warn!(base_url = %base, "Using non-HTTPS base URL (loopback only)");
            }
            other => {
                return Err(FeedError::InvalidBaseUrl(format!(
                    "unsupported scheme: {other}"
                )))
            }
        }

        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base: Arc::from(base),
            session_token: session_token.map(Arc::new),
        })
    }

    /// Fetch the cumulative feed window: up to `limit` posts, newest-first.
    ///
    /// Retries timeouts, 429, and 5xx with exponential backoff (1s, 2s,
    /// 4s). Client errors and malformed envelopes fail fast.
    pub async fn fetch_page(&self, limit: u32) -> Result<FeedPage, FeedError> {
        let url = format!("{}/api/feed?limit={}", self.base, limit);
        let mut retry_count = 0;

        loop {
            match self.fetch_page_once(&url).await {
                Ok(page) => {
                    if page.skipped > 0 {
                        tracing::warn!(
                            skipped = page.skipped,
                            total = page.posts.len(),
                            "Dropped malformed records from feed page"
                        );
                    }
                    return Ok(page);
                }
                Err(e) if e.is_retryable() && retry_count < MAX_RETRIES => {
                    let delay = 2u64.pow(retry_count);
                    tracing::debug!(
                        error = %e,
                        retry = retry_count + 1,
                        delay_secs = delay,
                        "Retrying feed fetch after transient error"
                    );
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    retry_count += 1;
                }
                Err(FeedError::HttpStatus(429)) => {
                    return Err(FeedError::RateLimited(retry_count))
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_page_once(&self, url: &str) -> Result<FeedPage, FeedError> {
        let response = tokio::time::timeout(PAGE_TIMEOUT, self.authed(self.http.get(url)).send())
            .await
            .map_err(|_| FeedError::Timeout)?
            .map_err(FeedError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_PAGE_BYTES).await?;
        decode::decode_page(&bytes).map_err(|e| FeedError::Decode(e.to_string()))
    }

    /// Fetch a media blob by resource id.
    pub async fn fetch_media(&self, resource_id: &str) -> Result<Arc<[u8]>, MediaError> {
        let url = format!("{}/api/media/{}", self.base, resource_id);
        let response = tokio::time::timeout(MEDIA_TIMEOUT, self.authed(self.http.get(&url)).send())
            .await
            .map_err(|_| MediaError::Timeout)?
            .map_err(|e| MediaError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_MEDIA_BYTES).await?;
        Ok(Arc::from(bytes.into_boxed_slice()))
    }

    /// End the session on the backend. Not retried; the caller can try
    /// again on failure.
    pub async fn log_out(&self) -> Result<(), FeedError> {
        let url = format!("{}/api/logout", self.base);
        let response = tokio::time::timeout(PAGE_TIMEOUT, self.authed(self.http.post(&url)).send())
            .await
            .map_err(|_| FeedError::Timeout)?
            .map_err(FeedError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_token {
            Some(token) => request.header("X-Session-Token", token.expose_secret()),
            None => request,
        }
    }
}

/// Redirect policy: at most 3 hops, no revisiting a URL already seen in the
/// chain.
fn create_redirect_policy() -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(|attempt| {
        if attempt.previous().len() > 3 {
            attempt.error("too many redirects")
        } else if attempt.previous().iter().any(|url| url == attempt.url()) {
            attempt.error("redirect loop detected")
        } else {
            tracing::debug!(
                url = %attempt.url(),
                hops = attempt.previous().len(),
                "Following redirect"
            );
            attempt.follow()
        }
    })
}

/// Read a response body up to `limit` bytes.
///
/// Content-Length is checked first so oversized responses fail before any
/// bytes transfer; the streamed accumulation catches servers that lie or
/// omit the header, and a short body against the header is an error rather
/// than a silently truncated result.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BodyError> {
    let expected = response.content_length();
    if let Some(len) = expected {
        if len as usize > limit {
            return Err(BodyError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(BodyError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(BodyError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(len) = expected {
        if bytes.len() < len as usize {
            return Err(BodyError::Incomplete {
                expected: len,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

//! Upstream fetch pipeline.
//!
//! Transport failures and timeouts are errors; any HTTP status is a valid
//! response, because the gateway relays non-2xx bodies to the page that
//! asked for them. The caller decides what a status means.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use packrat_core::{Error, ResourceRequest, ResourceResponse};
use reqwest::{Client, StatusCode, Url, header};
use std::time::{Duration, Instant};

/// Configuration for the upstream client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "packrat/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "packrat/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// Response from an upstream fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Headers that describe the transfer rather than the resource. The body is
/// re-framed when relayed or stored, so carrying these would lie.
const TRANSFER_HEADERS: &[&str] = &["connection", "content-encoding", "content-length", "keep-alive", "transfer-encoding"];

impl FetchResponse {
    /// Snapshot suitable for caching or relaying.
    ///
    /// Drops transfer-level headers and keeps every header value that is
    /// valid UTF-8.
    pub fn to_snapshot(&self) -> ResourceResponse {
        let headers = self
            .headers
            .iter()
            .filter(|(name, _)| !TRANSFER_HEADERS.contains(&name.as_str()))
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        ResourceResponse { status: self.status.as_u16(), headers, body: self.bytes.to_vec() }
    }
}

/// The network side of the strategy executors.
///
/// `Err` means the upstream was unreachable (transport failure or timeout);
/// a response with any status is `Ok`.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetch a resource snapshot.
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, Error>;
}

/// HTTP upstream client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// Respects the configured redirect and byte limits.
    pub async fn fetch(&self, request: &ResourceRequest) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(e.to_string())
            } else {
                Error::Upstream(format!("network error: {e}"))
            }
        })?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Upstream(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes, status {})",
            request.url,
            final_url,
            fetch_ms,
            bytes.len(),
            status.as_u16()
        );

        Ok(FetchResponse { url: request.url.clone(), final_url, status, content_type, bytes, headers, fetch_ms })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Upstream for FetchClient {
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, Error> {
        FetchClient::fetch(self, request).await.map(|r| r.to_snapshot())
    }
}

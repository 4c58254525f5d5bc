//! Strategy execution: the response-serving algorithms.
//!
//! Failures never cross the executor boundary; every path yields a
//! response. A store or lookup error degrades to a miss or a no-op, and an
//! unreachable upstream becomes a synthetic status response.

use packrat_client::Upstream;
use packrat_core::{NamedCache, ResourceRequest, ResourceResponse, Strategy};
use std::sync::Arc;

/// Runs the configured strategy for one request against the named cache and
/// the upstream.
#[derive(Clone)]
pub struct StrategyExecutor {
    cache: NamedCache,
    upstream: Arc<dyn Upstream>,
}

impl StrategyExecutor {
    pub fn new(cache: NamedCache, upstream: Arc<dyn Upstream>) -> Self {
        Self { cache, upstream }
    }

    pub(crate) fn upstream(&self) -> &Arc<dyn Upstream> {
        &self.upstream
    }

    /// Execute the strategy and produce the response served to the page.
    pub async fn execute(&self, strategy: Strategy, request: &ResourceRequest) -> ResourceResponse {
        match strategy {
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::PassThrough => self.pass_through(request).await,
        }
    }

    /// The cached copy wins; the upstream is contacted only on a miss.
    ///
    /// On a miss the fetched snapshot is stored before the response is
    /// returned, so an immediate repeat of the same request is a hit. An
    /// unreachable upstream yields the synthetic 503, never a raw error.
    async fn cache_first(&self, request: &ResourceRequest) -> ResourceResponse {
        match self.cache.lookup(&request.method, request.url.as_str()).await {
            Ok(Some(stored)) => {
                tracing::debug!(url = %request.url, "cache-first: hit");
                return stored;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache lookup failed, treating as miss");
            }
        }

        match self.upstream.fetch(request).await {
            Ok(response) => {
                if response.is_success()
                    && let Err(e) = self.cache.store(&request.method, request.url.as_str(), &response).await
                {
                    tracing::warn!(url = %request.url, error = %e, "cache store failed");
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "cache-first: miss and upstream unreachable");
                ResourceResponse::synthetic_unavailable()
            }
        }
    }

    /// The live response wins; the cache is the offline fallback.
    ///
    /// A successful fetch updates the cache fire-and-forget: the write never
    /// blocks or fails the response already being returned. On transport
    /// failure the cached copy is served, and the synthetic 503 covers the
    /// uncached case.
    async fn network_first(&self, request: &ResourceRequest) -> ResourceResponse {
        match self.upstream.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    let cache = self.cache.clone();
                    let method = request.method.clone();
                    let url = request.url.to_string();
                    let snapshot = response.clone();
                    tokio::spawn(async move {
                        if let Err(e) = cache.store(&method, &url, &snapshot).await {
                            tracing::warn!(url = %url, error = %e, "cache store failed");
                        }
                    });
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "network-first: upstream unreachable, trying cache");
                match self.cache.lookup(&request.method, request.url.as_str()).await {
                    Ok(Some(stored)) => stored,
                    Ok(None) => ResourceResponse::synthetic_unavailable(),
                    Err(err) => {
                        tracing::warn!(url = %request.url, error = %err, "cache lookup failed");
                        ResourceResponse::synthetic_unavailable()
                    }
                }
            }
        }
    }

    /// No interception logic: relay whatever the upstream yields, including
    /// error statuses. A transport failure becomes a 502.
    async fn pass_through(&self, request: &ResourceRequest) -> ResourceResponse {
        match self.upstream.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "pass-through: upstream unreachable");
                ResourceResponse::bad_gateway()
            }
        }
    }
}

//! Request dispatch: resolve a strategy, execute it.

use crate::executors::StrategyExecutor;
use crate::resolver;
use packrat_client::{Upstream, resolve_target};
use packrat_core::{CacheDb, Error, NamedCache, ResourceRequest, ResourceResponse, WorkerConfig};
use std::sync::Arc;
use url::Url;

/// Dispatches intercepted requests according to an immutable configuration
/// supplied at startup.
///
/// Holds the named-cache handle, the upstream, and nothing else mutable:
/// the explicit replacement for ambient singleton cache/config state.
#[derive(Clone)]
pub struct Dispatcher {
    config: WorkerConfig,
    db: CacheDb,
    origin: Url,
    cache: NamedCache,
    executor: StrategyExecutor,
}

impl Dispatcher {
    /// Open the configured named cache and wire the executor.
    pub async fn new(
        config: WorkerConfig, db: CacheDb, origin: Url, upstream: Arc<dyn Upstream>,
    ) -> Result<Self, Error> {
        let cache = db.open_cache(&config.cache_name).await?;
        let executor = StrategyExecutor::new(cache.clone(), upstream);
        Ok(Self { config, db, origin, cache, executor })
    }

    /// Name of the cache this deployment owns.
    pub fn cache_name(&self) -> &str {
        self.cache.name()
    }

    /// The upstream origin requests resolve against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Fetch and store every precache-listed resource.
    ///
    /// Each entry is awaited through its store before it counts as done.
    /// Failures are collected and reported as one `Error::Precache` naming
    /// the failed paths; entries that did land stay stored.
    pub(crate) async fn precache(&self) -> Result<(), Error> {
        let mut failed: Vec<String> = Vec::new();

        for path in &self.config.precache {
            if let Err(e) = self.precache_one(path).await {
                tracing::warn!(path = %path, error = %e, "precache entry failed");
                failed.push(path.clone());
            }
        }

        if failed.is_empty() {
            tracing::info!(
                cache = %self.cache.name(),
                entries = self.config.precache.len(),
                "precache complete"
            );
            Ok(())
        } else {
            Err(Error::Precache(failed.join(", ")))
        }
    }

    async fn precache_one(&self, path: &str) -> Result<(), Error> {
        let target = resolve_target(&self.origin, path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let request = ResourceRequest::get(target);

        let response = self.executor.upstream().fetch(&request).await?;
        if !response.is_success() {
            return Err(Error::Upstream(format!("status {} for {}", response.status, request.url)));
        }

        self.cache.store(&request.method, request.url.as_str(), &response).await
    }

    /// Drop cache rows left behind by deployments with other cache names.
    pub(crate) async fn purge_stale_caches(&self) -> Result<u64, Error> {
        self.db.purge_other_caches(&self.config.cache_name).await
    }

    /// Resolve and execute the strategy for one request.
    pub async fn dispatch(&self, request: &ResourceRequest) -> ResourceResponse {
        let strategy = resolver::resolve(request, &self.config.strategies);

        if self.config.request_log {
            tracing::debug!(method = %request.method, url = %request.url, strategy = %strategy, "dispatch");
        }

        self.executor.execute(strategy, request).await
    }
}

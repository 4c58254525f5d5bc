//! Worker lifecycle: install, activate, per-request dispatch.

use crate::dispatcher::Dispatcher;
use packrat_core::{Error, ResourceRequest, ResourceResponse};
use parking_lot::RwLock;

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Precaching the configured asset list.
    Installing,
    /// Installed; claiming the serving role and discarding stale caches.
    Activating,
    /// Serving: every request flows through the dispatcher.
    Active,
}

impl WorkerState {
    /// Whether requests are intercepted in this state.
    pub fn can_intercept(&self) -> bool {
        matches!(self, WorkerState::Active)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Activating => write!(f, "activating"),
            WorkerState::Active => write!(f, "active"),
        }
    }
}

/// The installable worker: owns the dispatcher and walks the
/// Installing -> Activating -> Active lifecycle once per process.
pub struct Worker {
    dispatcher: Dispatcher,
    state: RwLock<WorkerState>,
}

impl Worker {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher, state: RwLock::new(WorkerState::Installing) }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    /// Precache the configured asset list.
    ///
    /// Does not report completion until every entry has settled, so the
    /// process never starts serving over a half-built precache. There is no
    /// waiting period afterwards: the worker proceeds straight toward
    /// activation. A failure is returned for the caller to observe but does
    /// not keep the worker from activating.
    pub async fn install(&self) -> Result<(), Error> {
        tracing::info!(cache = self.dispatcher.cache_name(), "installing");
        let result = self.dispatcher.precache().await;
        *self.state.write() = WorkerState::Activating;
        result
    }

    /// Claim the serving role.
    ///
    /// Drops named caches left behind by older deployments and starts
    /// intercepting immediately: the very next request goes through the
    /// dispatcher. A failed purge is logged and does not block activation.
    pub async fn activate(&self) {
        match self.dispatcher.purge_stale_caches().await {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, "dropped entries from stale caches"),
            Err(e) => tracing::warn!(error = %e, "stale cache purge failed"),
        }

        *self.state.write() = WorkerState::Active;
        tracing::info!(cache = self.dispatcher.cache_name(), "worker active");
    }

    /// Per-request entry point.
    ///
    /// Requests arriving before activation get the synthetic 503; once
    /// active, every request is resolved and executed independently.
    pub async fn handle(&self, request: &ResourceRequest) -> ResourceResponse {
        let state = self.state();
        if !state.can_intercept() {
            tracing::warn!(url = %request.url, %state, "request before activation");
            return ResourceResponse::synthetic_unavailable();
        }

        self.dispatcher.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_intercepts() {
        assert!(!WorkerState::Installing.can_intercept());
        assert!(!WorkerState::Activating.can_intercept());
        assert!(WorkerState::Active.can_intercept());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(WorkerState::Installing.to_string(), "installing");
        assert_eq!(WorkerState::Activating.to_string(), "activating");
        assert_eq!(WorkerState::Active.to_string(), "active");
    }
}

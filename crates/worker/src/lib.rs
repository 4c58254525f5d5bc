//! The packrat worker: per-request caching strategy dispatch.
//!
//! The worker walks an install/activate lifecycle and then intercepts every
//! resource request addressed to the gateway:
//!
//! - install precaches the configured asset list into the named cache
//! - activate claims the serving role and drops caches from older deployments
//! - every intercepted request flows resolver -> executor -> response
//!
//! Configuration is supplied once at startup; the dispatcher holds no
//! mutable state beyond the cache handle it was given.

pub mod dispatcher;
pub mod executors;
pub mod lifecycle;
pub mod resolver;

pub use dispatcher::Dispatcher;
pub use executors::StrategyExecutor;
pub use lifecycle::{Worker, WorkerState};

//! Upstream HTTP client for packrat.
//!
//! This crate provides the fetch pipeline the strategy executors run
//! against, plus the `Upstream` trait seam that lets tests script network
//! behavior without sockets.

pub mod fetch;

pub use fetch::url::{UrlError, canonicalize_origin, resolve_target};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, Upstream};

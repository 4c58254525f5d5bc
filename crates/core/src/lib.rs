//! Core types and shared functionality for packrat.
//!
//! This crate provides:
//! - SQLite cache: named response caches plus the offline form store
//! - Unified error types
//! - Layered configuration
//! - The request/response snapshot model and strategy names

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod strategy;

pub use cache::{CacheDb, NamedCache, StoredItem};
pub use config::{AppConfig, WorkerConfig};
pub use error::Error;
pub use request::{ResourceRequest, ResourceResponse};
pub use strategy::Strategy;

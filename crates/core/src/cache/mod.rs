//! SQLite-backed persistent cache.
//!
//! This module provides the named response caches and the offline form
//! store, both living in one SQLite database with async access via
//! tokio-rusqlite. It supports:
//!
//! - Named caches of full response snapshots keyed by request identity
//! - The key-value form store
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod kv;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::NamedCache;
pub use kv::StoredItem;

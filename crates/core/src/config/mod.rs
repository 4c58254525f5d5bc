//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PACKRAT_*)
//! 2. TOML config file (if PACKRAT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

mod validation;

pub use validation::ConfigError;

/// Worker configuration: cache identity, precache list, strategy rules.
///
/// Created once at process start and immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Name of the persistent response cache this deployment owns.
    ///
    /// Set via PACKRAT_WORKER__CACHE_NAME. Caches with other names are
    /// purged when the worker activates.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Paths fetched and stored at install time.
    ///
    /// Set via PACKRAT_WORKER__PRECACHE (or the TOML file).
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Strategy rules keyed by exact path, file extension (".js"), or the
    /// reserved "default" key.
    #[serde(default = "default_strategies")]
    pub strategies: BTreeMap<String, Strategy>,

    /// Whether the dispatch path emits a per-request log line.
    ///
    /// Set via PACKRAT_WORKER__REQUEST_LOG. Also selects the default log
    /// filter level when RUST_LOG is unset.
    #[serde(default = "default_true")]
    pub request_log: bool,
}

fn default_cache_name() -> String {
    "packrat-static-v1".into()
}

fn default_precache() -> Vec<String> {
    vec!["/index.html".into(), "/app.js".into(), "/app.css".into()]
}

fn default_strategies() -> BTreeMap<String, Strategy> {
    BTreeMap::from([
        ("/index.html".into(), Strategy::NetworkFirst),
        (".js".into(), Strategy::CacheFirst),
        (".css".into(), Strategy::CacheFirst),
        (".png".into(), Strategy::CacheFirst),
        ("default".into(), Strategy::NetworkFirst),
    ])
}

fn default_true() -> bool {
    true
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            precache: default_precache(),
            strategies: default_strategies(),
            request_log: true,
        }
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PACKRAT_*)
/// 2. TOML config file (if PACKRAT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket address the gateway listens on.
    ///
    /// Set via PACKRAT_LISTEN_ADDR environment variable.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Base URL of the upstream origin the gateway fronts.
    ///
    /// Set via PACKRAT_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite cache database.
    ///
    /// Set via PACKRAT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for upstream requests.
    ///
    /// Set via PACKRAT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per upstream request.
    ///
    /// Set via PACKRAT_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Upstream request timeout in milliseconds.
    ///
    /// Set via PACKRAT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Worker configuration (cache name, precache list, strategy rules).
    #[serde(default)]
    pub worker: WorkerConfig,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8787".into()
}

fn default_origin() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./packrat-cache.sqlite")
}

fn default_user_agent() -> String {
    "packrat/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            worker: WorkerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PACKRAT_`
    /// 2. TOML file from `PACKRAT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PACKRAT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PACKRAT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:8787");
        assert_eq!(config.origin, "http://127.0.0.1:8000");
        assert_eq!(config.db_path, PathBuf::from("./packrat-cache.sqlite"));
        assert_eq!(config.user_agent, "packrat/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
    }

    #[test]
    fn test_default_worker_config() {
        let worker = WorkerConfig::default();
        assert_eq!(worker.cache_name, "packrat-static-v1");
        assert!(worker.precache.contains(&"/index.html".to_string()));
        assert_eq!(worker.strategies.get(".js"), Some(&Strategy::CacheFirst));
        assert_eq!(worker.strategies.get("default"), Some(&Strategy::NetworkFirst));
        assert!(worker.request_log);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_worker_config_from_toml() {
        let worker: WorkerConfig = Figment::from(Toml::string(
            r#"
            cache_name = "site-v2"
            precache = ["/index.html"]
            request_log = false

            [strategies]
            "/index.html" = "network-first"
            ".js" = "cache-first"
            "default" = "pass-through"
            "#,
        ))
        .extract()
        .unwrap();

        assert_eq!(worker.cache_name, "site-v2");
        assert_eq!(worker.strategies.get("default"), Some(&Strategy::PassThrough));
        assert!(!worker.request_log);
    }
}

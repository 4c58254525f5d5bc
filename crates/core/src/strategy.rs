//! Caching strategy names.

use serde::{Deserialize, Serialize};

/// Response-serving strategy chosen per request.
///
/// `NetworkFirst` favors freshness and suits frequently-changing content;
/// `CacheFirst` favors latency and offline availability and suits immutable
/// static assets. `PassThrough` forwards to the network with no interception
/// logic at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Serve from the cache, touching the network only on a miss.
    CacheFirst,
    /// Serve from the network, falling back to the cache when unreachable.
    #[default]
    NetworkFirst,
    /// Forward to the network with no cache interaction.
    PassThrough,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::CacheFirst => write!(f, "cache-first"),
            Strategy::NetworkFirst => write!(f, "network-first"),
            Strategy::PassThrough => write!(f, "pass-through"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serde_names() {
        let parsed: Strategy = serde_json::from_str("\"cache-first\"").unwrap();
        assert_eq!(parsed, Strategy::CacheFirst);
        let parsed: Strategy = serde_json::from_str("\"network-first\"").unwrap();
        assert_eq!(parsed, Strategy::NetworkFirst);
        let parsed: Strategy = serde_json::from_str("\"pass-through\"").unwrap();
        assert_eq!(parsed, Strategy::PassThrough);
    }

    #[test]
    fn test_strategy_serde_rejects_unknown() {
        let parsed: Result<Strategy, _> = serde_json::from_str("\"stale-while-revalidate\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_strategy_default_is_network_first() {
        assert_eq!(Strategy::default(), Strategy::NetworkFirst);
    }

    #[test]
    fn test_strategy_display_round_trip() {
        for strategy in [Strategy::CacheFirst, Strategy::NetworkFirst, Strategy::PassThrough] {
            let name = strategy.to_string();
            let parsed: Strategy = serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(parsed, strategy);
        }
    }
}

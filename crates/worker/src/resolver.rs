//! Per-request strategy resolution.

use packrat_core::{ResourceRequest, Strategy};
use std::collections::BTreeMap;

/// Reserved rule key consulted when neither path nor extension match.
pub const DEFAULT_RULE: &str = "default";

/// Resolve the strategy for a request.
///
/// Lookup order: exact path, then file extension, then the reserved
/// `"default"` rule, then `NetworkFirst`. A path rule always overrides an
/// extension rule, and an extension rule always overrides the default;
/// configurations rely on this precedence. Total: every request yields
/// exactly one strategy.
pub fn resolve(request: &ResourceRequest, rules: &BTreeMap<String, Strategy>) -> Strategy {
    let path = request.path();

    if let Some(strategy) = rules.get(path) {
        return *strategy;
    }

    if let Some(strategy) = rules.get(extension(path)) {
        return *strategy;
    }

    rules.get(DEFAULT_RULE).copied().unwrap_or_default()
}

/// File extension of a path: the substring from the last `.` to the end,
/// empty when the path has no dot.
fn extension(path: &str) -> &str {
    path.rfind('.').map(|i| &path[i..]).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request(path: &str) -> ResourceRequest {
        ResourceRequest::get(Url::parse(&format!("http://origin.local{path}")).unwrap())
    }

    fn rules(pairs: &[(&str, Strategy)]) -> BTreeMap<String, Strategy> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_exact_path_beats_extension() {
        let rules = rules(&[
            ("/index.html", Strategy::NetworkFirst),
            (".html", Strategy::CacheFirst),
        ]);

        assert_eq!(resolve(&request("/index.html"), &rules), Strategy::NetworkFirst);
        assert_eq!(resolve(&request("/about.html"), &rules), Strategy::CacheFirst);
    }

    #[test]
    fn test_extension_beats_default() {
        let rules = rules(&[(".js", Strategy::CacheFirst), (DEFAULT_RULE, Strategy::PassThrough)]);

        assert_eq!(resolve(&request("/bundle.js"), &rules), Strategy::CacheFirst);
        assert_eq!(resolve(&request("/api/items"), &rules), Strategy::PassThrough);
    }

    #[test]
    fn test_configured_default() {
        let rules = rules(&[(DEFAULT_RULE, Strategy::CacheFirst)]);
        assert_eq!(resolve(&request("/anything"), &rules), Strategy::CacheFirst);
    }

    #[test]
    fn test_fallback_without_default_is_network_first() {
        let rules = rules(&[(".css", Strategy::CacheFirst)]);
        assert_eq!(resolve(&request("/no-rule-matches"), &rules), Strategy::NetworkFirst);
    }

    #[test]
    fn test_empty_rules_total() {
        let rules = BTreeMap::new();
        assert_eq!(resolve(&request("/index.html"), &rules), Strategy::NetworkFirst);
    }

    #[test]
    fn test_query_not_part_of_path() {
        let rules = rules(&[("/search", Strategy::PassThrough)]);
        assert_eq!(resolve(&request("/search?q=x.js"), &rules), Strategy::PassThrough);
    }

    #[test]
    fn test_extension_extraction() {
        assert_eq!(extension("/app.js"), ".js");
        assert_eq!(extension("/archive.tar.gz"), ".gz");
        assert_eq!(extension("/api/items"), "");
        assert_eq!(extension("/"), "");
    }
}

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value;

use crate::filters::FilterOption;

/// One resolved page, exactly as served to views.
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    pub rows: Vec<Value>,
    pub total: u64,
    /// Decoded envelope (or raw payload when malformed), for callers
    /// that read summary fields off it.
    pub root: Value,
}

impl PageData {
    pub fn empty_with_root(root: Value) -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            root,
        }
    }
}

/// Composite key identifying one page fetch.
///
/// Every request dimension participates, so two views of the same
/// endpoint with different filters never collide.
pub fn page_key(
    endpoint: &str,
    page: u64,
    limit: u64,
    search: &str,
    query: &BTreeMap<String, String>,
    deps: &[String],
) -> String {
    let query_json = serde_json::to_string(query).unwrap_or_default();
    let deps_json = serde_json::to_string(deps).unwrap_or_default();
    format!("{endpoint}|{page}|{limit}|{search}|{query_json}|{deps_json}")
}

/// Key identifying one filter-option fetch.
pub fn option_key(endpoint: &str, page: u64, limit: u64, search: &str) -> String {
    format!("{endpoint}|{page}|{limit}|{search}")
}

/// In-memory cache of fetched pages. Entries live until invalidated;
/// freshness is the caller's concern (`force` refetches bypass it).
#[derive(Default)]
pub struct PageCache {
    entries: RwLock<HashMap<String, PageData>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<PageData> {
        self.entries.read().unwrap().get(key).cloned()
    }

    pub fn set(&self, key: &str, data: PageData) {
        self.entries.write().unwrap().insert(key.to_string(), data);
    }

    /// Drop every entry for one endpoint (all pages, searches and
    /// filter combinations).
    pub fn invalidate_endpoint(&self, endpoint: &str) {
        let prefix = format!("{endpoint}|");
        self.entries
            .write()
            .unwrap()
            .retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn invalidate_all(&self) {
        self.entries.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory cache of mapped filter options.
#[derive(Default)]
pub struct OptionCache {
    entries: RwLock<HashMap<String, Vec<FilterOption>>>,
}

impl OptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<FilterOption>> {
        self.entries.read().unwrap().get(key).cloned()
    }

    pub fn set(&self, key: &str, options: Vec<FilterOption>) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), options);
    }

    pub fn invalidate_all(&self) {
        self.entries.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(total: u64) -> PageData {
        PageData {
            rows: vec![json!({"id": 1})],
            total,
            root: json!({"data": [{"id": 1}]}),
        }
    }

    #[test]
    fn key_covers_every_dimension() {
        let mut query = BTreeMap::new();
        query.insert("status".to_string(), "open".to_string());
        let deps = vec!["company:3".to_string()];

        let base = page_key("leads", 1, 10, "", &query, &deps);
        assert_ne!(base, page_key("leads", 2, 10, "", &query, &deps));
        assert_ne!(base, page_key("leads", 1, 25, "", &query, &deps));
        assert_ne!(base, page_key("leads", 1, 10, "acme", &query, &deps));
        assert_ne!(base, page_key("users", 1, 10, "", &query, &deps));
        assert_ne!(base, page_key("leads", 1, 10, "", &BTreeMap::new(), &deps));
        assert_ne!(base, page_key("leads", 1, 10, "", &query, &[]));
        // Same inputs, same key.
        assert_eq!(base, page_key("leads", 1, 10, "", &query, &deps));
    }

    #[test]
    fn query_key_is_order_independent() {
        let mut a = BTreeMap::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        let mut b = BTreeMap::new();
        b.insert("a".to_string(), "1".to_string());
        b.insert("b".to_string(), "2".to_string());
        assert_eq!(page_key("x", 1, 10, "", &a, &[]), page_key("x", 1, 10, "", &b, &[]));
    }

    #[test]
    fn page_cache_roundtrip_and_invalidate() {
        let cache = PageCache::new();
        let key = page_key("leads", 1, 10, "", &BTreeMap::new(), &[]);
        assert!(cache.get(&key).is_none());

        cache.set(&key, page(7));
        assert_eq!(cache.get(&key).unwrap().total, 7);

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn endpoint_invalidation_spares_other_endpoints() {
        let cache = PageCache::new();
        let leads1 = page_key("leads", 1, 10, "", &BTreeMap::new(), &[]);
        let leads2 = page_key("leads", 2, 10, "", &BTreeMap::new(), &[]);
        let users = page_key("users", 1, 10, "", &BTreeMap::new(), &[]);
        cache.set(&leads1, page(1));
        cache.set(&leads2, page(2));
        cache.set(&users, page(3));

        cache.invalidate_endpoint("leads");
        assert!(cache.get(&leads1).is_none());
        assert!(cache.get(&leads2).is_none());
        assert_eq!(cache.get(&users).unwrap().total, 3);
    }

    #[test]
    fn option_cache_roundtrip() {
        let cache = OptionCache::new();
        let key = option_key("roles", 1, 50, "");
        assert!(cache.get(&key).is_none());

        cache.set(&key, vec![FilterOption::new("admin", "Admin")]);
        assert_eq!(cache.get(&key).unwrap()[0].value, "admin");

        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}

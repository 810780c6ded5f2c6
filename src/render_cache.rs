use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDateTime;

/// Rendered output keyed by kind and link, e.g. `datalog` + `hello-datalogs`.
/// An entry is only served for the time window it was rendered for.
pub struct RenderCache<T> {
    entries: Option<RwLock<EntryMap<T>>>,
}

type EntryMap<T> = HashMap<String, CachedEntry<T>>;

pub enum Expire {
    Never,
    At(NaiveDateTime),
}

struct CachedEntry<T> {
    rendered_at: NaiveDateTime,
    expire_date: NaiveDateTime,
    value: Arc<T>,
}

impl<T> CachedEntry<T> {
    fn is_valid(&self, now: NaiveDateTime) -> bool {
        self.rendered_at <= now && now < self.expire_date
    }
}

fn entry_key(kind: &str, link: &str) -> String {
    format!("{}:{}", kind, link)
}

impl<T> RenderCache<T> {
    pub fn new() -> Self {
        RenderCache { entries: Some(RwLock::new(HashMap::new())) }
    }

    pub fn non_caching() -> Self {
        RenderCache { entries: None }
    }

    pub fn from_flag(enabled: bool) -> Self {
        if enabled { Self::new() } else { Self::non_caching() }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Stores `content` as rendered at `rendered_at`. It is served from then until `expire`.
    pub fn add_entry(&self, kind: &str, link: &str, content: T, rendered_at: NaiveDateTime, expire: Expire) -> Arc<T> {
        let value = Arc::new(content);
        let Some(ref entries) = self.entries else {
            return value;
        };

        let expire_date = match expire {
            Expire::Never => NaiveDateTime::MAX,
            Expire::At(date) => date,
        };

        if let Ok(mut map) = entries.write() {
            map.insert(entry_key(kind, link), CachedEntry { rendered_at, expire_date, value: value.clone() });
        }
        value
    }

    pub fn get_entry(&self, kind: &str, link: &str, now: NaiveDateTime) -> Option<Arc<T>> {
        let entries = self.entries.as_ref()?;
        let map = entries.read().ok()?;
        let entry = map.get(&entry_key(kind, link))?;
        if !entry.is_valid(now) {
            return None;
        }
        Some(entry.value.clone())
    }
}

impl<T> Default for RenderCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::text_utils::parse_date_time;

    use super::*;

    fn at(date: &str) -> NaiveDateTime {
        parse_date_time(date).unwrap()
    }

    #[test]
    fn test_add_and_get_never_expires() {
        let cache = RenderCache::new();
        let content = "<h1>Hello</h1>".to_string();

        let cached = cache.add_entry("datalog", "hello", content.clone(), at("2024-01-01"), Expire::Never);
        assert_eq!(Arc::strong_count(&cached), 2);

        let retrieved = cache.get_entry("datalog", "hello", at("2099-01-01")).unwrap();
        assert_eq!(retrieved.as_ref(), &content);
        assert!(cache.get_entry("system", "hello", at("2024-01-01")).is_none());
    }

    #[test]
    fn test_expires_at() {
        let cache = RenderCache::new();
        cache.add_entry("page", "about", "About".to_string(), at("2024-04-01"), Expire::At(at("2024-04-21")));

        assert!(cache.get_entry("page", "about", at("2024-04-01")).is_some());
        assert!(cache.get_entry("page", "about", at("2024-04-20 23:59:59")).is_some());
        assert!(cache.get_entry("page", "about", at("2024-04-21")).is_none());
        assert!(cache.get_entry("page", "about", at("2024-05-01")).is_none());
    }

    #[test]
    fn test_not_served_before_render_time() {
        let cache = RenderCache::new();
        cache.add_entry("datalog", "size-classes", 2, at("2024-05-01"), Expire::Never);
        assert!(cache.get_entry("datalog", "size-classes", at("2024-04-01")).is_none());
    }

    #[test]
    fn test_replaced_entry() {
        let cache = RenderCache::new();
        cache.add_entry("system", "ledger-sync", 1, at("2024-01-01"), Expire::At(at("2024-02-01")));
        cache.add_entry("system", "ledger-sync", 2, at("2024-02-01"), Expire::Never);
        assert_eq!(*cache.get_entry("system", "ledger-sync", at("2024-03-01")).unwrap(), 2);
    }

    #[test]
    fn test_non_caching() {
        let cache: RenderCache<String> = RenderCache::from_flag(false);
        assert!(!cache.is_enabled());

        let cached = cache.add_entry("datalog", "x", "X".to_string(), at("2024-01-01"), Expire::Never);
        assert_eq!(Arc::strong_count(&cached), 1);
        assert!(cache.get_entry("datalog", "x", at("2024-01-01")).is_none());
    }
}

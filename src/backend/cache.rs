//! In-process TTL cache for full-dataset fallbacks.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

/// Volatile key-value store consulted before full refetches. Values are
/// JSON documents so one cache serves every entity shape.
pub trait VolatileCache: Send + Sync {
    fn get(&self, key: &str) -> Option<serde_json::Value>;
    fn put(&self, key: &str, value: serde_json::Value);
}

struct Entry {
    stored_at: Instant,
    value: serde_json::Value,
}

/// LRU-bounded cache whose entries expire after a fixed TTL. Expired
/// entries are dropped on read.
pub struct TtlCache {
    entries: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }
}

impl VolatileCache for TtlCache {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => {}
            None => return None,
        }
        entries.pop(key);
        None
    }

    fn put(&self, key: &str, value: serde_json::Value) {
        self.entries.lock().put(
            key.to_string(),
            Entry {
                stored_at: Instant::now(),
                value,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_entries_are_returned() {
        let cache = TtlCache::new(4, Duration::from_secs(60));
        cache.put("assessments:all", json!([1, 2, 3]));
        assert_eq!(cache.get("assessments:all"), Some(json!([1, 2, 3])));
        assert_eq!(cache.get("courses:all"), None);
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = TtlCache::new(4, Duration::from_millis(5));
        cache.put("assessments:all", json!("stale"));
        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(cache.get("assessments:all"), None);
        // A second read still misses: the entry is gone, not just hidden.
        assert_eq!(cache.get("assessments:all"), None);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = TtlCache::new(2, Duration::from_secs(60));
        cache.put("a", json!(1));
        cache.put("b", json!(2));
        cache.get("a");
        cache.put("c", json!(3));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(json!(1)));
        assert_eq!(cache.get("c"), Some(json!(3)));
    }
}

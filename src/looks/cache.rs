//! Fingerprint Cache
//! Mission: Serve repeat look requests without touching the stores
//!
//! Process-local TTL map keyed by request fingerprint `(anchor_sku,
//! num_looks)`. Entries expire lazily on read; past the capacity the
//! least-recently-used entry is evicted on write. Values are shared as
//! `Arc` and treated as frozen.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::LooksResponse;

/// Request fingerprint: anchor SKU plus requested look count.
pub type Fingerprint = (String, usize);

struct CacheEntry {
    value: Arc<LooksResponse>,
    expires_at: Instant,
    last_used: Instant,
}

pub struct FingerprintCache {
    entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl FingerprintCache {
    pub fn new(ttl_seconds: u64, capacity: usize) -> Self {
        Self::with_ttl(Duration::from_secs(ttl_seconds), capacity)
    }

    pub fn with_ttl(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Returns the cached response if present and unexpired; bumps its
    /// recency. Expired entries are removed on the spot.
    pub fn get(&self, key: &Fingerprint) -> Option<Arc<LooksResponse>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get_mut(key) {
            Some(entry) if now < entry.expires_at => {
                entry.last_used = now;
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or refresh an entry. A second put for the same key resets its
    /// TTL; overflow evicts the least-recently-used entry.
    pub fn put(&self, key: Fingerprint, value: Arc<LooksResponse>) {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
                last_used: now,
            },
        );

        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LookItem;
    use std::thread::sleep;

    fn response(sku: &str) -> Arc<LooksResponse> {
        Arc::new(LooksResponse {
            anchor: LookItem {
                sku: sku.to_string(),
                title: String::new(),
                brand: String::new(),
                image_url: String::new(),
                item_type: String::new(),
                color: String::new(),
                slot: "base_top".to_string(),
            },
            looks: vec![],
            total_looks: 0,
        })
    }

    fn key(sku: &str) -> Fingerprint {
        (sku.to_string(), 3)
    }

    #[test]
    fn test_hit_returns_same_arc() {
        let cache = FingerprintCache::new(300, 16);
        let value = response("A");
        cache.put(key("A"), value.clone());

        let hit = cache.get(&key("A")).unwrap();
        assert!(Arc::ptr_eq(&hit, &value));
        assert!(cache.get(&key("B")).is_none());
    }

    #[test]
    fn test_expiry_is_lazy() {
        let cache = FingerprintCache::with_ttl(Duration::from_millis(10), 16);
        cache.put(key("A"), response("A"));
        assert!(cache.get(&key("A")).is_some());

        sleep(Duration::from_millis(20));
        assert!(cache.get(&key("A")).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_put_resets_ttl() {
        let cache = FingerprintCache::with_ttl(Duration::from_millis(40), 16);
        cache.put(key("A"), response("A"));
        sleep(Duration::from_millis(25));
        cache.put(key("A"), response("A"));
        sleep(Duration::from_millis(25));
        // 50ms after the first put, 25ms after the refresh
        assert!(cache.get(&key("A")).is_some());
    }

    #[test]
    fn test_lru_eviction_past_capacity() {
        let cache = FingerprintCache::new(300, 2);
        cache.put(key("A"), response("A"));
        sleep(Duration::from_millis(2));
        cache.put(key("B"), response("B"));
        sleep(Duration::from_millis(2));

        // Touch A so B becomes the LRU entry
        assert!(cache.get(&key("A")).is_some());
        sleep(Duration::from_millis(2));

        cache.put(key("C"), response("C"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("B")).is_none());
        assert!(cache.get(&key("A")).is_some());
        assert!(cache.get(&key("C")).is_some());
    }
}

//! Bounded decision cache.
//!
//! Memoizes (source, title) → category to avoid repeated remote
//! classification. Least-recently-used eviction at a fixed capacity.
//!
//! Correctness caveat: criticality depends on body content that is not part
//! of the cache key, so a stored critical verdict is never served. A sender
//! cached as critical must not cause every future message from that sender
//! to skip fresh evaluation. `put` refuses the critical category outright
//! and `get` treats a stored critical entry as absent.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tracing::debug;

use crate::category::Category;

/// Default maximum number of cache entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Maximum number of title characters contributing to the cache key.
const KEY_TITLE_CHARS: usize = 50;

struct CacheInner {
    map: HashMap<String, Category>,
    /// Keys in recency order, least-recently-used at the front.
    order: VecDeque<String>,
}

/// Bounded LRU cache mapping (source, title) to a resolved category.
///
/// Safe for concurrent use from multiple in-flight event units.
pub struct DecisionCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

impl DecisionCache {
    /// Creates a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache with the given capacity (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Looks up a prior verdict. A stored critical verdict is reported as
    /// absent and dropped.
    pub fn get(&self, source: &str, title: &str) -> Option<Category> {
        let key = cache_key(source, title);
        let mut inner = self.lock();

        match inner.map.get(&key).copied() {
            None => None,
            Some(category) if category.is_critical() => {
                // put refuses critical entries; drop any that slipped in.
                inner.map.remove(&key);
                inner.order.retain(|k| k != &key);
                None
            }
            Some(category) => {
                touch(&mut inner.order, &key);
                Some(category)
            }
        }
    }

    /// Stores a verdict, evicting the least-recently-used entry when full.
    /// Critical verdicts are refused.
    pub fn put(&self, source: &str, title: &str, category: Category) {
        if category.is_critical() {
            debug!(source, "refusing to cache critical verdict");
            return;
        }

        let key = cache_key(source, title);
        let mut inner = self.lock();

        if inner.map.insert(key.clone(), category).is_some() {
            touch(&mut inner.order, &key);
            return;
        }

        inner.order.push_back(key);
        if inner.map.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.map.remove(&evicted);
            }
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// Returns true when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all entries.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.order.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        // A poisoned lock means a panic mid-insert at worst; the map stays
        // usable and a stale recency order only affects eviction choice.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(source: &str, title: &str) -> String {
    let truncated: String = title.chars().take(KEY_TITLE_CHARS).collect();
    format!("{source}|{truncated}")
}

fn touch(order: &mut VecDeque<String>, key: &str) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        order.remove(pos);
    }
    order.push_back(key.to_string());
}

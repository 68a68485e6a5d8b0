//! Memoization cache for resolved values
//!
//! Pure cache: it is never the source of truth, and eviction is harmless.
//! The only correctness obligation is invalidation completeness — between
//! an `invalidate` and the next `put` for a key, `get` returns a miss.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// Default per-scope capacity; one entry per key is plenty for typical
/// schemas, larger schemas just recompute on eviction.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Size-bounded LRU cache keyed by configuration key.
///
/// One instance per scope; interior mutability so reads can share the
/// scope's read lock.
#[derive(Debug)]
pub struct ValueCache<T: Clone> {
    entries: Mutex<LruCache<String, T>>,
}

impl<T: Clone> ValueCache<T> {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a cache bounded to `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached value for `key`, or a miss.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.lock().get(key).cloned()
    }

    /// Store a freshly resolved value.
    pub fn put(&self, key: &str, value: T) {
        self.entries.lock().put(key.to_string(), value);
    }

    /// Drop the cached value for `key`.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().pop(key);
    }

    /// Drop every cached value for the scope.
    pub fn invalidate_all(&self) {
        self.entries.lock().clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<T: Clone> Default for ValueCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

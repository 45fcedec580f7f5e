//! Dependency graph caching with TTL
//!
//! Graph builds are expensive (one catalog round-trip per schema set), so the
//! built graph is memoized with time-to-live expiration and explicitly
//! invalidated after schema migrations. There is deliberately no build lock:
//! concurrent callers racing on a cold cache may each rebuild, which is
//! accepted because rebuilds are idempotent for the same schema set.

use restoreplan_core::DependencyGraph;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Derive a cache key from a schema set
///
/// The list is sorted and deduplicated before hashing, so logically identical
/// schema sets given in different order map to the same entry. An
/// order-sensitive key would silently disable memoization reuse.
pub fn schema_set_key(schemas: &[String]) -> String {
    let mut names: Vec<&str> = schemas.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.dedup();

    let mut hasher = Sha256::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Cache entry for a built dependency graph
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached graph
    graph: Arc<DependencyGraph>,

    /// When this entry was created
    created_at: Instant,

    /// Time-to-live for this entry
    ttl: Duration,
}

impl CacheEntry {
    /// Check if this cache entry is still valid
    fn is_valid(&self) -> bool {
        self.created_at.elapsed() < self.ttl
    }
}

/// Dependency graph cache with TTL support
///
/// Stores built graphs keyed by schema-set digest. Expired entries are
/// evicted on access.
pub struct GraphCache {
    /// Cache storage
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,

    /// Default TTL for cache entries
    default_ttl: Duration,
}

impl GraphCache {
    /// Create a new graph cache with the given default TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: ttl,
        }
    }

    /// Insert a built graph, returning the shared handle stored in the cache
    pub fn insert(&self, key: String, graph: DependencyGraph) -> Arc<DependencyGraph> {
        let graph = Arc::new(graph);
        let entry = CacheEntry {
            graph: Arc::clone(&graph),
            created_at: Instant::now(),
            ttl: self.default_ttl,
        };

        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, entry);
        }

        graph
    }

    /// Get a graph from the cache if it exists and is not expired
    pub fn get(&self, key: &str) -> Option<Arc<DependencyGraph>> {
        if let Ok(entries) = self.entries.read() {
            if let Some(entry) = entries.get(key) {
                if entry.is_valid() {
                    return Some(Arc::clone(&entry.graph));
                }
            }
        }

        // Entry doesn't exist or is expired - evict it
        self.invalidate(key);
        None
    }

    /// Evict a specific entry from the cache
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Number of entries in the cache (including expired)
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all expired entries
    pub fn evict_expired(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| entry.is_valid());
        }
    }

    /// Get cache statistics
    ///
    /// Returns (total_entries, valid_entries, expired_entries)
    pub fn stats(&self) -> (usize, usize, usize) {
        if let Ok(entries) = self.entries.read() {
            let total = entries.len();
            let valid = entries.values().filter(|e| e.is_valid()).count();
            (total, valid, total - valid)
        } else {
            (0, 0, 0)
        }
    }
}

impl Default for GraphCache {
    /// Create a cache with the default TTL of one hour
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

//! Bounded in-memory cache for query embeddings
//!
//! An explicit fixed-capacity cache passed as a dependency, never a hidden
//! module-level map. Eviction is least-recently-inserted: the oldest entries
//! go first when the capacity is reached.

use std::collections::HashMap;
use std::collections::VecDeque;

use tokio::sync::RwLock;
use tracing::debug;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheInner {
    entries: HashMap<String, Vec<f32>>,
    insertion_order: VecDeque<String>,
    stats: CacheStats,
}

/// Fixed-capacity embedding cache
pub struct EmbeddingCache {
    inner: RwLock<CacheInner>,
    capacity: usize,
}

impl EmbeddingCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
                stats: CacheStats::default(),
            }),
            capacity,
        }
    }

    pub async fn get(&self, text: &str) -> Option<Vec<f32>> {
        let mut inner = self.inner.write().await;
        if let Some(vector) = inner.entries.get(text).cloned() {
            inner.stats.hits += 1;
            return Some(vector);
        }
        inner.stats.misses += 1;
        None
    }

    pub async fn put(&self, text: &str, vector: Vec<f32>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.write().await;
        if inner.entries.contains_key(text) {
            return;
        }

        while inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.insertion_order.pop_front() {
                inner.entries.remove(&oldest);
                inner.stats.evictions += 1;
            } else {
                break;
            }
        }

        inner.entries.insert(text.to_string(), vector);
        inner.insertion_order.push_back(text.to_string());
        debug!("Cached embedding ({} entries)", inner.entries.len());
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_returns_stored_vectors() {
        let cache = EmbeddingCache::new(4);
        cache.put("hello", vec![1.0, 2.0]).await;
        assert_eq!(cache.get("hello").await, Some(vec![1.0, 2.0]));
        assert_eq!(cache.get("missing").await, None);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn cache_evicts_oldest_at_capacity() {
        let cache = EmbeddingCache::new(2);
        cache.put("a", vec![1.0]).await;
        cache.put("b", vec![2.0]).await;
        cache.put("c", vec![3.0]).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("c").await, Some(vec![3.0]));
        assert_eq!(cache.stats().await.evictions, 1);
    }

    #[tokio::test]
    async fn zero_capacity_cache_stores_nothing() {
        let cache = EmbeddingCache::new(0);
        cache.put("a", vec![1.0]).await;
        assert!(cache.is_empty().await);
    }
}

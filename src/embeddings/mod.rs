//! Embeddings generation module
//!
//! Converts text to fixed-dimension vectors via an external provider API
//! (OpenAI- or Ollama-shaped endpoints). The service wraps any
//! [`EmbeddingProvider`] with an explicit bounded cache so repeated query
//! text does not re-hit the provider.

pub mod cache;
pub mod client;

pub use cache::CacheStats;
pub use cache::EmbeddingCache;
pub use client::EmbeddingClient;
pub use client::ProviderKind;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;

/// External capability: text in, fixed-dimension vector out
///
/// Implementations fail with `ProviderUnavailable` when the backing model is
/// not ready; callers treat that as a skippable stage failure.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Provider plus bounded cache, the unit the retrieval engine depends on
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    cache: EmbeddingCache,
}

impl EmbeddingService {
    #[must_use]
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache_capacity: usize) -> Self {
        Self {
            provider,
            cache: EmbeddingCache::new(cache_capacity),
        }
    }

    /// Build the production service from configuration
    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let client = EmbeddingClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config.embeddings.cache_capacity))
    }

    /// Generate an embedding, consulting the cache first
    ///
    /// Cache hits and misses return identical vectors for identical text, so
    /// caching never changes ranking behavior.
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(vector) = self.cache.get(text).await {
            return Ok(vector);
        }

        let vector = self.provider.embed(text).await?;
        self.cache.put(text, vector.clone()).await;
        Ok(vector)
    }

    /// Cache statistics for telemetry
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

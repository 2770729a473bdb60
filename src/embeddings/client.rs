//! Embedding API client for OpenAI- and Ollama-shaped providers

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::EmbeddingProvider;
use crate::errors::CampusRagError;
use crate::errors::Result;

/// Supported embedding provider API shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `OpenAI` embeddings API
    OpenAI,
    /// Ollama local embeddings
    Ollama,
}

/// Client for generating embeddings from an external provider
pub struct EmbeddingClient {
    kind: ProviderKind,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    pub fn new(
        kind: ProviderKind,
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CampusRagError::Http(e.to_string()))?;

        Ok(Self {
            kind,
            model,
            endpoint,
            api_key,
            client,
        })
    }

    /// Build a client from configuration
    ///
    /// Provider shape is inferred from the configured key and endpoint:
    /// `ollama` key or a non-OpenAI endpoint selects the Ollama API.
    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let endpoint = config.embedding_endpoint().to_string();
        let kind = if config.embeddings.api_key == "ollama" || !endpoint.contains("openai") {
            ProviderKind::Ollama
        } else {
            ProviderKind::OpenAI
        };
        let api_key = match kind {
            ProviderKind::OpenAI => Some(config.embeddings.api_key.clone()),
            ProviderKind::Ollama => None,
        };

        Self::new(kind, config.embedding_model().to_string(), endpoint, api_key)
    }

    async fn generate_openai(&self, text: &str) -> Result<Vec<f32>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| CampusRagError::Config("OpenAI API key not provided".to_string()))?;

        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            input: &'a str,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling OpenAI embeddings API: {}", url);

        let request = OpenAIRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CampusRagError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CampusRagError::ProviderUnavailable(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| CampusRagError::Embedding(format!("Failed to parse response: {e}")))?;

        result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| CampusRagError::Embedding("No embedding in response".to_string()))
    }

    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CampusRagError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CampusRagError::ProviderUnavailable(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| CampusRagError::Embedding(format!("Failed to parse response: {e}")))?;

        Ok(result.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.kind {
            ProviderKind::OpenAI => self.generate_openai(text).await,
            ProviderKind::Ollama => self.generate_ollama(text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_with_ollama_key_selects_ollama() {
        let config = crate::config::AppConfig::default();
        let client = EmbeddingClient::from_config(&config).unwrap();
        assert_eq!(client.kind, ProviderKind::Ollama);
        assert!(client.api_key.is_none());
    }

    #[tokio::test]
    #[ignore = "Requires a running embedding endpoint"]
    async fn test_ollama_embedding() {
        let client = EmbeddingClient::new(
            ProviderKind::Ollama,
            "nomic-embed-text".to_string(),
            "http://localhost:11434".to_string(),
            None,
        )
        .unwrap();

        let embedding = client.embed("Hello, world!").await.unwrap();
        assert!(!embedding.is_empty());
    }
}

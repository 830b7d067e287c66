//! OpenAI-compatible embedding provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::HttpClientTrait;
use crate::domain::embedding::{Embedding, EmbeddingProvider};
use crate::domain::DomainError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// Embedding provider for the OpenAI `/v1/embeddings` API and compatible servers
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    /// Create a provider requesting `dimensions`-long vectors from `model`
    pub fn new(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: model.into(),
            dimensions,
        }
    }

    /// Point the provider at a custom base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, body: serde_json::Value) -> Result<Embedding, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(body).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        let data = response
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .ok_or_else(|| DomainError::provider("openai", "Response contained no embeddings"))?;

        if data.embedding.len() != self.dimensions {
            return Err(DomainError::provider(
                "openai",
                format!(
                    "Expected {} dimensions, model returned {}",
                    self.dimensions,
                    data.embedding.len()
                ),
            ));
        }

        Ok(Embedding::new(data.embedding))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let body = json!({
            "model": self.model,
            "input": text,
            "dimensions": self.dimensions,
        });

        let response = self
            .client
            .post_json(&self.embeddings_url(), self.headers(), &body)
            .await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

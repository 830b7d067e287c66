//! Embedding provider implementations

mod hashing;
mod http_client;
mod openai;

pub use hashing::HashingEmbeddingProvider;
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{OpenAiEmbeddingProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;

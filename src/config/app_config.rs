use serde::Deserialize;

use crate::domain::RetryConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Chunking, indexing and retrieval settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Vector length shared by the index and the embedding provider
    pub dimensions: usize,
    pub default_chunk_size: usize,
    pub default_chunk_overlap: usize,
    pub candidate_multiplier: usize,
    pub embedding_concurrency: usize,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Deterministic local vectors, no network access
    #[default]
    Hashing,
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed the built-in chunking strategies when the store is empty
    pub default_strategies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimensions: 256,
            default_chunk_size: 200,
            default_chunk_overlap: 20,
            candidate_multiplier: 4,
            embedding_concurrency: 4,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: None,
            base_url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            default_strategies: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(value: serde_json::Value) -> AppConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.dimensions, 256);
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Hashing);
        assert!(config.seed.default_strategies);
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config = from_json(serde_json::json!({
            "engine": { "dimensions": 1536, "retry": { "max_retries": 5 } },
            "embedding": { "provider": "openai", "api_key": "sk-test" }
        }));

        assert_eq!(config.engine.dimensions, 1536);
        assert_eq!(config.engine.default_chunk_size, 200);
        assert_eq!(config.engine.retry.max_retries, 5);
        assert_eq!(config.engine.retry.initial_delay_ms, 100);
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::OpenAi);
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_log_format_lowercase() {
        let config = from_json(serde_json::json!({
            "logging": { "level": "debug", "format": "json" }
        }));

        assert!(matches!(config.logging.format, LogFormat::Json));
    }
}

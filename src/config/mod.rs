//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EmbeddingConfig, EmbeddingProviderKind, EngineConfig, LogFormat, LoggingConfig,
    SeedConfig, ServerConfig,
};

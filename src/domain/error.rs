use thiserror::Error;

use crate::domain::retrieval::WriteStage;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider {
        provider: String,
        message: String,
        retryable: bool,
    },

    #[error("Index consistency error: {message}")]
    IndexConsistency { message: String },

    #[error("Write failed at {stage} stage: {source}")]
    WriteFailed {
        stage: WriteStage,
        #[source]
        source: Box<DomainError>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Permanent provider failure, surfaced without retrying
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Transient provider failure, eligible for retry with backoff
    pub fn provider_transient(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            retryable: true,
        }
    }

    pub fn index_consistency(message: impl Into<String>) -> Self {
        Self::IndexConsistency {
            message: message.into(),
        }
    }

    pub fn write_failed(stage: WriteStage, source: DomainError) -> Self {
        Self::WriteFailed {
            stage,
            source: Box::new(source),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the embedding provider reported this failure as transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider { retryable: true, .. })
    }

    /// Unwraps pipeline stage wrappers down to the triggering cause
    pub fn root_cause(&self) -> &DomainError {
        match self {
            Self::WriteFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether a caller may reasonably retry the failed operation later
    pub fn is_retryable_failure(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::Provider { .. }
                | Self::IndexConsistency { .. }
                | Self::Storage { .. }
                | Self::Internal { .. }
        )
    }
}

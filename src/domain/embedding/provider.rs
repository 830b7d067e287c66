//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::Embedding;
use crate::domain::DomainError;

/// Trait for embedding providers (local hashing, OpenAI-compatible APIs, ...)
///
/// Failures are reported as [`DomainError::Provider`]; the `retryable` flag
/// tells the caller whether the same request may succeed later.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a single piece of text
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Dimensionality of the vectors this provider produces
    fn dimensions(&self) -> usize;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::domain::gate::Gate;

    /// Deterministic provider with scripted vectors and failures
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        vectors: HashMap<String, Vec<f32>>,
        error: Option<String>,
        failing_texts: HashMap<String, String>,
        gates: HashMap<String, Arc<Gate>>,
        transient_failures: Mutex<usize>,
        calls: AtomicUsize,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                vectors: HashMap::new(),
                error: None,
                failing_texts: HashMap::new(),
                gates: HashMap::new(),
                transient_failures: Mutex::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        /// Return `vector` whenever `text` is embedded
        pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.into(), vector);
            self
        }

        /// Fail every call with a permanent error
        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        /// Fail permanently whenever `text` is embedded
        pub fn with_failing_text(mut self, text: impl Into<String>, error: impl Into<String>) -> Self {
            self.failing_texts.insert(text.into(), error.into());
            self
        }

        /// Park every embedding of `text` at `gate`
        pub fn with_gate(mut self, text: impl Into<String>, gate: Arc<Gate>) -> Self {
            self.gates.insert(text.into(), gate);
            self
        }

        /// Fail the next `count` calls with a transient error
        pub fn with_transient_failures(self, count: usize) -> Self {
            *self.transient_failures.lock().unwrap() = count;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hashed_vector(&self, text: &str) -> Vec<f32> {
            let hash = text.bytes().fold(0u64, |acc, b| {
                acc.wrapping_mul(31).wrapping_add(b as u64)
            });
            (0..self.dimensions)
                .map(|i| ((hash.wrapping_add(i as u64 * 7919) % 1000) as f32 / 1000.0) + 0.001)
                .collect()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }

            if let Some(error) = self.failing_texts.get(text) {
                return Err(DomainError::provider("mock", error));
            }

            if let Some(gate) = self.gates.get(text) {
                gate.pass().await;
            }

            {
                let mut remaining = self.transient_failures.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(DomainError::provider_transient("mock", "temporarily unavailable"));
                }
            }

            let vector = self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| self.hashed_vector(text));

            Ok(Embedding::new(vector))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_dimensions() {
            let provider = MockEmbeddingProvider::new(128);
            let embedding = provider.embed("Hello").await.unwrap();
            assert_eq!(embedding.dimensions(), 128);
        }

        #[tokio::test]
        async fn test_mock_provider_scripted_vector() {
            let provider = MockEmbeddingProvider::new(2).with_vector("north", vec![0.0, 1.0]);
            let embedding = provider.embed("north").await.unwrap();
            assert_eq!(embedding.vector(), &[0.0, 1.0]);
        }

        #[tokio::test]
        async fn test_mock_provider_transient_then_success() {
            let provider = MockEmbeddingProvider::new(4).with_transient_failures(1);

            let err = provider.embed("Hello").await.unwrap_err();
            assert!(err.is_transient());
            assert!(provider.embed("Hello").await.is_ok());
            assert_eq!(provider.calls(), 2);
        }

        #[tokio::test]
        async fn test_mock_provider_gate_parks_until_released() {
            let gate = Arc::new(Gate::new());
            let provider = Arc::new(MockEmbeddingProvider::new(2).with_gate("slow", Arc::clone(&gate)));

            let task = tokio::spawn({
                let provider = Arc::clone(&provider);
                async move { provider.embed("slow").await }
            });
            gate.reached().await;
            assert!(!task.is_finished());
            assert!(provider.embed("fast").await.is_ok());

            gate.release();
            assert!(task.await.unwrap().is_ok());
        }

        #[tokio::test]
        async fn test_mock_provider_failing_text() {
            let provider = MockEmbeddingProvider::new(2).with_failing_text("bad", "rejected");
            assert!(provider.embed("bad").await.is_err());
            assert!(provider.embed("good").await.is_ok());
        }

        #[tokio::test]
        async fn test_deterministic_embeddings() {
            let provider = MockEmbeddingProvider::new(16);
            let first = provider.embed("Hello").await.unwrap();
            let second = provider.embed("Hello").await.unwrap();
            assert_eq!(first, second);
        }
    }
}

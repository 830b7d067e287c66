//! Embedding vectors and similarity

use serde::{Deserialize, Serialize};

/// A fixed-length embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self(vector)
    }

    /// Get the embedding vector
    pub fn vector(&self) -> &[f32] {
        &self.0
    }

    /// Get the embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Whether every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }

    /// Consume and return the vector
    pub fn into_vector(self) -> Vec<f32> {
        self.0
    }

    /// Similarity score against another embedding, in [0, 1]
    pub fn similarity(&self, other: &Embedding) -> f32 {
        similarity_score(&self.0, &other.0)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vector: Vec<f32>) -> Self {
        Self(vector)
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine similarity clamped into [0, 1]; anti-correlated vectors score 0
pub fn similarity_score(a: &[f32], b: &[f32]) -> f32 {
    let similarity = cosine_similarity(a, b);
    if similarity.is_nan() {
        return 0.0;
    }
    similarity.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let similarity = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((similarity - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let similarity = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(similarity.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let similarity = cosine_similarity(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0]);
        assert!((similarity + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_similarity_score_clamps_negative() {
        assert_eq!(similarity_score(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(similarity_score(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_embedding_similarity_scale_invariant() {
        let a = Embedding::new(vec![1.0, 1.0, 0.0]);
        let b = Embedding::new(vec![3.0, 3.0, 0.0]);
        assert!((a.similarity(&b) - 1.0).abs() < 0.0001);
        assert_eq!(a.dimensions(), 3);
        assert!(a.is_finite());
        assert!(!Embedding::new(vec![f32::NAN]).is_finite());
    }
}

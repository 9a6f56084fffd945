//! Sentence embeddings and cosine similarity.
//!
//! The pipeline holds an `Arc<dyn Embedder>`, chosen at startup from
//! `EMBEDDING_BACKEND`: `LocalEmbedder` (fastembed, in-process) or
//! `RemoteEmbedder` (Hugging Face feature-extraction).

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "local-embeddings")]
mod local;
mod remote;

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;
pub use remote::RemoteEmbedder;

/// A fixed-dimension vector produced by the embedding model.
pub type Embedding = Vec<f32>;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding model failed: {0}")]
    Model(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no embedding")]
    Empty,

    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// A pretrained sentence encoder.
///
/// `embed` is deterministic for a fixed model and input. Input text is passed
/// through untouched; truncation is the model's own business.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError>;

    fn model_name(&self) -> &str;

    fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32, EmbedError> {
        cosine_similarity(a, b)
    }
}

/// `dot(a, b) / (|a| * |b|)`, clamped to [-1, 1].
///
/// Symmetric in its arguments. A zero-norm vector has no direction and
/// scores 0.0 against everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbedError> {
    if a.len() != b.len() {
        return Err(EmbedError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

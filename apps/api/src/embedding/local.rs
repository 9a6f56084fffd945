use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use super::{EmbedError, Embedder, Embedding};

const LOCAL_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// In-process all-MiniLM-L6-v2 (384 dimensions) on the ONNX runtime.
///
/// The model is downloaded into the fastembed cache on first use. Inference is
/// CPU-bound, so every call runs on the blocking pool.
#[derive(Clone)]
pub struct LocalEmbedder {
    model: Arc<TextEmbedding>,
}

impl LocalEmbedder {
    /// Loads the model. Blocking; call from `spawn_blocking` at startup.
    pub fn load() -> Result<Self, EmbedError> {
        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2);
        let model = TextEmbedding::try_new(options).map_err(|e| EmbedError::Model(e.to_string()))?;
        info!("Loaded local embedding model {LOCAL_MODEL_NAME}");
        Ok(Self {
            model: Arc::new(model),
        })
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        let model = Arc::clone(&self.model);
        let input = text.to_owned();

        let mut vectors = tokio::task::spawn_blocking(move || model.embed(vec![input], None))
            .await
            .map_err(|e| EmbedError::Model(format!("embedding task failed: {e}")))?
            .map_err(|e| EmbedError::Model(e.to_string()))?;

        vectors.pop().ok_or(EmbedError::Empty)
    }

    fn model_name(&self) -> &str {
        LOCAL_MODEL_NAME
    }
}

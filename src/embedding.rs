//! Embedding providers: the seam between chunk text and vector space.
//!
//! A service holds exactly one provider, so every vector in a corpus index
//! comes from the same embedding space; mixing models corrupts similarity
//! ordering.

use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::embedding::EmbeddingModel;
use rig::providers::openai;

use crate::types::RagError;

/// Converts batches of text into fixed-dimension vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the underlying model.
    fn id(&self) -> &str;

    /// Embeds all `texts` in one batched call; the returned vectors are in
    /// input order and share one dimension.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;
}

/// OpenAI-backed provider via rig's embedding client.
#[derive(Clone)]
pub struct OpenAiEmbeddingProvider {
    client: openai::Client,
    model_name: String,
}

impl OpenAiEmbeddingProvider {
    pub fn new(client: openai::Client, model_name: &str) -> Self {
        Self {
            client,
            model_name: model_name.to_string(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn id(&self) -> &str {
        &self.model_name
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.client.embedding_model(&self.model_name);
        let embeddings = model
            .embed_texts(texts.to_vec())
            .await
            .map_err(|err| RagError::Upstream(format!("embedding request failed: {err}")))?;
        Ok(embeddings
            .into_iter()
            .map(|embedding| embedding.vec.into_iter().map(|v| v as f32).collect())
            .collect())
    }
}

/// Deterministic hash-derived embeddings for tests and offline runs.
///
/// Vectors carry no semantic signal; identical text always maps to an
/// identical vector, which is enough for exercising index lifecycle and
/// retrieval plumbing.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dims: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dims: 8 }
    }

    pub fn with_dims(dims: usize) -> Self {
        Self { dims }
    }

    fn hash_to_vec(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();
        (0..self.dims)
            .map(|i| {
                let bits = seed.rotate_left((i % 64) as u32 * 8) ^ ((i as u64) << 24);
                (bits as f32) / u32::MAX as f32
            })
            .collect()
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn id(&self) -> &str {
        "mock-embedder"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|text| self.hash_to_vec(text)).collect())
    }
}

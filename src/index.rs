//! In-memory exact nearest-neighbor index over embedded chunks.
//!
//! A flat list with a full cosine scan is deliberate: corpora here are a
//! handful of books, so exactness and simple replacement semantics beat an
//! approximate structure. An index is immutable once built; a reload builds a
//! fresh one and swaps it in whole.

use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::types::{Chunk, RagError};

/// A chunk paired with its embedding vector; the unit stored and searched.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Searchable snapshot of the currently loaded corpus.
#[derive(Debug, Default)]
pub struct CorpusIndex {
    entries: Vec<IndexEntry>,
    dims: usize,
}

impl CorpusIndex {
    /// Embeds every chunk in one batched provider call and builds the index.
    ///
    /// A provider failure aborts the build; the caller's previous index (if
    /// any) is untouched.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        chunks: Vec<Chunk>,
    ) -> Result<Self, RagError> {
        if chunks.is_empty() {
            return Ok(Self::default());
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(RagError::Upstream(format!(
                "embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let dims = vectors[0].len();
        if vectors.iter().any(|vector| vector.len() != dims) {
            return Err(RagError::Upstream(
                "embedding provider returned mixed dimensions".into(),
            ));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();
        debug!(
            entries = entries.len(),
            dims,
            model = provider.id(),
            "built corpus index"
        );
        Ok(Self { entries, dims })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector dimension shared by every entry; zero for an empty index.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Top-`k` entries by cosine similarity to `query`, descending; ties keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<&IndexEntry> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.vector)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored
            .into_iter()
            .take(k)
            .map(|(i, _)| &self.entries[i])
            .collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;

    fn chunk(text: &str, seq: usize) -> Chunk {
        Chunk {
            text: text.to_string(),
            source_id: "src".to_string(),
            seq,
        }
    }

    fn index_from_vectors(vectors: Vec<Vec<f32>>) -> CorpusIndex {
        let dims = vectors.first().map(Vec::len).unwrap_or(0);
        let entries = vectors
            .into_iter()
            .enumerate()
            .map(|(i, vector)| IndexEntry {
                chunk: chunk(&format!("entry {i}"), i),
                vector,
            })
            .collect();
        CorpusIndex { entries, dims }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn search_orders_by_descending_similarity() {
        let index = index_from_vectors(vec![
            vec![0.0, 1.0],  // orthogonal
            vec![1.0, 0.0],  // exact match
            vec![1.0, 1.0],  // in between
            vec![-1.0, 0.0], // opposite
        ]);
        let hits = index.search(&[1.0, 0.0], 4);
        let order: Vec<usize> = hits.iter().map(|entry| entry.chunk.seq).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn search_returns_exactly_k_of_larger_index() {
        let vectors = (0..10)
            .map(|i| vec![1.0, i as f32 / 10.0])
            .collect::<Vec<_>>();
        let index = index_from_vectors(vectors);
        assert_eq!(index.search(&[1.0, 0.0], 4).len(), 4);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = index_from_vectors(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![2.0, 0.0], // same direction as entry 1, same cosine
        ]);
        let hits = index.search(&[1.0, 0.0], 3);
        let order: Vec<usize> = hits.iter().map(|entry| entry.chunk.seq).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let index = index_from_vectors(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(index.search(&[1.0, 0.0], 10).len(), 2);
    }

    #[tokio::test]
    async fn build_pairs_every_chunk_with_a_vector() {
        let provider = MockEmbeddingProvider::new();
        let chunks = vec![chunk("alpha", 0), chunk("beta", 1), chunk("gamma", 2)];
        let index = CorpusIndex::build(&provider, chunks).await.unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dims(), 8);
    }

    #[tokio::test]
    async fn empty_corpus_builds_an_empty_index() {
        let provider = MockEmbeddingProvider::new();
        let index = CorpusIndex::build(&provider, Vec::new()).await.unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0; 8], 4).is_empty());
    }
}

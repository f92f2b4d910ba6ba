use serde::Serialize;

use crate::retrieval::chunking::chunk_text;
use crate::retrieval::embeddings::{EmbeddingError, EmbeddingProvider};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("chunk/embedding count mismatch: {chunks} chunks, {embeddings} embeddings")]
    Mismatch { chunks: usize, embeddings: usize },

    #[error("vector store has no entries")]
    Empty,

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// One retrieval hit: the chunk text, its original index, and its L2 distance
/// from the query embedding.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub index: usize,
    pub text: String,
    pub distance: f32,
}

/// In-memory pair of parallel sequences: chunks and their embeddings, built
/// once and immutable afterwards.
#[derive(Debug)]
pub struct VectorStore {
    chunks: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl VectorStore {
    /// The 1:1 chunk/embedding invariant and the non-empty guarantee are both
    /// enforced here, so `search` never has to consider either case.
    pub fn new(chunks: Vec<String>, embeddings: Vec<Vec<f32>>) -> Result<Self, StoreError> {
        if chunks.len() != embeddings.len() {
            return Err(StoreError::Mismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }
        if chunks.is_empty() {
            return Err(StoreError::Empty);
        }
        Ok(Self { chunks, embeddings })
    }

    /// Chunk `text` and embed every chunk through `embedder`, which must be
    /// the same provider later used for queries.
    pub async fn build(
        text: &str,
        chunk_size: usize,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self, StoreError> {
        let chunks = chunk_text(text, chunk_size);
        let embeddings = embedder.embed_batch(&chunks).await?;
        Self::new(chunks, embeddings)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Brute-force nearest-neighbor lookup: L2 distance against every stored
    /// embedding, ascending. The sort is stable, so ties keep original index
    /// order. O(n*d) per query.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .zip(self.embeddings.iter())
            .enumerate()
            .map(|(index, (chunk, embedding))| ScoredChunk {
                index,
                text: chunk.clone(),
                distance: l2_distance(query, embedding),
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);
        scored
    }
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

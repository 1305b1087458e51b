//! Immutable in-memory vector index with cosine-similarity search.
//!
//! An index is built once from a transcript's chunks and their embeddings,
//! then only read. Reloading a transcript builds a fresh index; the old one
//! is dropped when the last reference goes away.

use crate::chunking::TextChunk;
use crate::error::{Result, SvarError};

/// A chunk stored with its embedding.
#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: TextChunk,
    embedding: Vec<f32>,
}

/// A search hit with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Text content of the matched chunk.
    pub content: String,
    /// Order of the chunk in the source transcript.
    pub order: usize,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
}

/// Immutable vector index over one transcript's chunks.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from parallel chunk and embedding sequences.
    ///
    /// The sequences must have equal length; a mismatch means the embedding
    /// stage lost or invented vectors and is reported as an invariant
    /// violation rather than an input error.
    pub fn build(chunks: Vec<TextChunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(SvarError::Invariant(format!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        Ok(Self { entries })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the `k` chunks most similar to the query embedding, best-first.
    ///
    /// Returns fewer than `k` results when the index is smaller; `k == 0`
    /// returns an empty vec. Score ties are broken by original chunk order,
    /// earlier chunk first, so retrieval is deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Err(SvarError::NotReady("index holds no chunks".to_string()));
        }

        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                content: entry.chunk.content.clone(),
                order: entry.chunk.order,
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.order.cmp(&b.order))
        });
        results.truncate(k);

        Ok(results)
    }
}

/// Compute cosine similarity between two vectors.
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

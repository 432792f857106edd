//! Vector index: the embedding function paired with a vector store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::document::{Chunk, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::{EmbeddedChunk, VectorStore};

/// Wraps an [`EmbeddingProvider`] and a [`VectorStore`] behind the two
/// operations the pipeline needs: insert chunks, search by query text.
///
/// Insert mutates persistent storage; search is read-only. Both may run
/// concurrently — any serialization needed happens inside the store.
pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl VectorIndex {
    /// Create a new index over the given embedding provider and store.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Embed each chunk's text and persist vector + chunk together.
    ///
    /// Returns store-assigned ids in input order. Empty input returns an
    /// empty list without invoking the embedding backend.
    ///
    /// # Errors
    ///
    /// Surfaces embedding and storage failures unmodified; callers must be
    /// able to tell a backend failure from an empty corpus.
    pub async fn insert(&self, chunks: Vec<Chunk>) -> Result<Vec<String>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let records: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect();

        let ids = self.store.insert(records).await?;
        info!(inserted = ids.len(), "persisted chunks to vector store");
        Ok(ids)
    }

    /// Embed `query` and return the `k` nearest records, ascending by
    /// distance, ties in insertion order.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&embedding, k).await?;
        debug!(k, found = results.len(), "vector search complete");
        Ok(results)
    }

    /// Current record count. Advisory: a backend failure logs a warning and
    /// reports 0 rather than propagating.
    pub async fn count(&self) -> usize {
        match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "failed to read vector store count");
                0
            }
        }
    }
}

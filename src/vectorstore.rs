//! Vector store trait for persisting and searching embedded chunks.

use async_trait::async_trait;

use crate::document::{Chunk, ScoredChunk};
use crate::error::Result;

/// A [`Chunk`] paired with its embedding, ready for insertion.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    /// The chunk to persist.
    pub chunk: Chunk,
    /// The embedding of the chunk's text.
    pub embedding: Vec<f32>,
}

/// A persisted record: a chunk, its embedding, and the store-assigned id.
///
/// Owned exclusively by the store. Created on insert, never mutated.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// Store-assigned identifier.
    pub id: String,
    /// The persisted chunk.
    pub chunk: Chunk,
    /// The persisted embedding.
    pub embedding: Vec<f32>,
}

/// A storage backend for embedded chunks with nearest-neighbor search.
///
/// The store speaks a single score convention: **distance**, non-negative,
/// ascending = more similar. Implementations must be safe for concurrent
/// readers; `search` is read-only on shared state, and records inserted
/// before a search begins are visible to it.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist records, assigning an id to each. Returns ids in input order.
    ///
    /// No implicit deduplication: inserting the same chunks twice stores
    /// them twice.
    async fn insert(&self, records: Vec<EmbeddedChunk>) -> Result<Vec<String>>;

    /// Return the `k` records nearest to `embedding`, ordered by ascending
    /// distance. Ties are broken by insertion order.
    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Return the current record count.
    async fn count(&self) -> Result<usize>;
}

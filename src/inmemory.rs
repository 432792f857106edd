//! In-memory vector store using cosine distance.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by an
//! insertion-ordered `Vec` behind a `tokio::sync::RwLock`. It is suitable
//! for development, testing, and single-operator corpora that fit in memory.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::ScoredChunk;
use crate::error::Result;
use crate::vectorstore::{EmbeddedChunk, VectorRecord, VectorStore};

/// An in-memory [`VectorStore`] using cosine distance for search.
///
/// Records live in a single insertion-ordered `Vec` guarded by a
/// `tokio::sync::RwLock`, so concurrent searches take shared read locks
/// while inserts serialize behind a write lock. Search is a full scan with
/// a stable sort, which keeps equal distances in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: RwLock<Vec<VectorRecord>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine distance between two vectors: `1 - cosine_similarity`.
///
/// Returns the maximum distance (1.0) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(&self, entries: Vec<EmbeddedChunk>) -> Result<Vec<String>> {
        let mut records = self.records.write().await;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = Uuid::new_v4().to_string();
            ids.push(id.clone());
            records.push(VectorRecord { id, chunk: entry.chunk, embedding: entry.embedding });
        }
        Ok(ids)
    }

    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let records = self.records.read().await;

        let mut scored: Vec<ScoredChunk> = records
            .iter()
            .map(|record| ScoredChunk {
                chunk: record.chunk.clone(),
                distance: cosine_distance(&record.embedding, embedding),
            })
            .collect();

        // Stable sort keeps equal distances in insertion order.
        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;

    fn chunk(text: &str, sequence_index: usize) -> Chunk {
        Chunk { text: text.to_string(), source: "test.pdf".to_string(), page: Some(1), sequence_index }
    }

    fn entry(text: &str, sequence_index: usize, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk { chunk: chunk(text, sequence_index), embedding }
    }

    #[tokio::test]
    async fn search_orders_by_ascending_distance() {
        let store = InMemoryVectorStore::new();
        store
            .insert(vec![
                entry("far", 0, vec![0.0, 1.0]),
                entry("near", 1, vec![1.0, 0.0]),
                entry("middling", 2, vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(results[0].chunk.text, "near");
        assert_eq!(results[1].chunk.text, "middling");
        assert_eq!(results[2].chunk.text, "far");
        assert!(results[0].distance <= results[1].distance);
        assert!(results[1].distance <= results[2].distance);
    }

    #[tokio::test]
    async fn equal_distances_keep_insertion_order() {
        let store = InMemoryVectorStore::new();
        store
            .insert(vec![
                entry("first", 0, vec![1.0, 0.0]),
                entry("second", 1, vec![1.0, 0.0]),
                entry("third", 2, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 3).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn zero_magnitude_embedding_is_maximally_distant() {
        let store = InMemoryVectorStore::new();
        store.insert(vec![entry("zero", 0, vec![0.0, 0.0])]).await.unwrap();
        let results = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].distance, 1.0);
    }

    #[tokio::test]
    async fn insert_returns_ids_in_input_order_and_counts_duplicates() {
        let store = InMemoryVectorStore::new();
        let batch = vec![entry("a", 0, vec![1.0, 0.0]), entry("b", 1, vec![0.0, 1.0])];

        let first_ids = store.insert(batch.clone()).await.unwrap();
        assert_eq!(first_ids.len(), 2);
        assert_eq!(store.count().await.unwrap(), 2);

        // Same chunks again: stored again, never deduplicated.
        let second_ids = store.insert(batch).await.unwrap();
        assert_eq!(second_ids.len(), 2);
        assert_eq!(store.count().await.unwrap(), 4);
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
    }
}

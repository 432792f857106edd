//! Retrieval with relevance filtering and evidence rendering.

use tracing::info;

use crate::config::RetrievalConfig;
use crate::document::ScoredChunk;
use crate::error::Result;
use crate::index::VectorIndex;

/// Queries the vector index and applies the relevance-distance threshold.
///
/// The threshold is a hard cutoff, not a ranking tweak: a result whose
/// distance exceeds it is dropped entirely, even if that empties the set.
pub struct Retriever {
    top_k: usize,
    score_threshold: f32,
}

impl Retriever {
    /// Create a retriever with the given retrieval configuration.
    pub fn new(config: &RetrievalConfig) -> Self {
        Self { top_k: config.top_k, score_threshold: config.score_threshold }
    }

    /// Retrieve evidence for `query`.
    ///
    /// Searches with `top_k` (or the configured default) and drops results
    /// beyond the distance threshold. Surviving results stay in ascending
    /// distance order.
    pub async fn retrieve(
        &self,
        index: &VectorIndex,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<ScoredChunk>> {
        let k = top_k.unwrap_or(self.top_k);
        info!(query, top_k = k, "retrieving evidence");

        let results = index.search(query, k).await?;
        let found = results.len();
        let filtered: Vec<ScoredChunk> =
            results.into_iter().filter(|r| r.distance <= self.score_threshold).collect();

        info!(found, kept = filtered.len(), threshold = self.score_threshold, "filtered by distance");
        Ok(filtered)
    }

    /// Render surviving results into a single ordered evidence block.
    ///
    /// Each result becomes a numbered block with source, page, relevance
    /// percentage, and the full chunk text, joined by blank lines in the
    /// same order as the input. Downstream generation sees the most
    /// relevant evidence first, so the ordering is part of the contract.
    pub fn format_context(&self, results: &[ScoredChunk]) -> String {
        let blocks: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let page = result
                    .chunk
                    .page
                    .map_or_else(|| "N/A".to_string(), |p| p.to_string());
                format!(
                    "[Document {} - Source: {}, Page: {} (Relevance: {:.1}%)]\n{}\n",
                    i + 1,
                    result.chunk.source,
                    page,
                    result.relevance() * 100.0,
                    result.chunk.text
                )
            })
            .collect();
        blocks.join("\n")
    }
}

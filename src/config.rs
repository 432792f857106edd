//! Configuration for the ingestion-to-retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Which chunk construction strategy the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Chunk boundaries at title elements (preserves document structure).
    Title,
    /// Fixed-size windows with overlap (robust for unstructured pages).
    #[default]
    Window,
}

/// Parameters for both chunking strategies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkingConfig {
    /// Strategy used to build chunks.
    #[serde(default)]
    pub strategy: ChunkStrategy,
    /// Hard cap on chunk length for the title-delimited strategy.
    pub max_characters: usize,
    /// Soft limit after which the title-delimited strategy starts a new chunk.
    pub new_after_n_chars: usize,
    /// Trailing fragments below this length are merged into the previous chunk.
    pub combine_text_under_n_chars: usize,
    /// Target chunk length for the fixed-window strategy.
    pub chunk_size: usize,
    /// Characters carried forward between consecutive fixed-window chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::default(),
            max_characters: 1500,
            new_after_n_chars: 1200,
            combine_text_under_n_chars: 300,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Parameters for retrieval and relevance filtering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Number of nearest records to request from the vector index.
    pub top_k: usize,
    /// Maximum distance at which a result is still usable evidence.
    ///
    /// A hard cutoff: results beyond it are dropped entirely, even if that
    /// empties the result set.
    pub score_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5, score_threshold: 0.7 }
    }
}

/// Thresholds for the chunk quality gate.
///
/// These are corpus-dependent heuristics, so they are configuration rather
/// than constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityConfig {
    /// Minimum chunk length in characters, measured after cleaning.
    pub min_chunk_chars: usize,
    /// Pages shorter than this (after cleaning) are skipped before splitting.
    pub min_page_chars: usize,
    /// Maximum tolerated fraction of single-character words.
    pub max_single_char_ratio: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self { min_chunk_chars: 100, min_page_chars: 50, max_single_char_ratio: 0.3 }
    }
}

/// Configuration for the full pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Chunk construction parameters.
    pub chunking: ChunkingConfig,
    /// Retrieval and filtering parameters.
    pub retrieval: RetrievalConfig,
    /// Quality gate thresholds.
    pub quality: QualityConfig,
}

impl RagConfig {
    /// Create a new builder for constructing a validated [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the chunk construction strategy.
    pub fn strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.config.chunking.strategy = strategy;
        self
    }

    /// Set the hard cap on title-delimited chunk length.
    pub fn max_characters(mut self, n: usize) -> Self {
        self.config.chunking.max_characters = n;
        self
    }

    /// Set the soft limit after which a new title-delimited chunk starts.
    pub fn new_after_n_chars(mut self, n: usize) -> Self {
        self.config.chunking.new_after_n_chars = n;
        self
    }

    /// Set the length below which trailing fragments are merged backwards.
    pub fn combine_text_under_n_chars(mut self, n: usize) -> Self {
        self.config.chunking.combine_text_under_n_chars = n;
        self
    }

    /// Set the fixed-window chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunking.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive fixed-window chunks.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunking.chunk_overlap = overlap;
        self
    }

    /// Set the number of results to request from the vector index.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.retrieval.top_k = k;
        self
    }

    /// Set the maximum distance for usable evidence.
    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.config.retrieval.score_threshold = threshold;
        self
    }

    /// Set the minimum chunk length after cleaning.
    pub fn min_chunk_chars(mut self, n: usize) -> Self {
        self.config.quality.min_chunk_chars = n;
        self
    }

    /// Set the minimum page length before splitting.
    pub fn min_page_chars(mut self, n: usize) -> Self {
        self.config.quality.min_page_chars = n;
        self
    }

    /// Set the maximum tolerated single-character-word ratio.
    pub fn max_single_char_ratio(mut self, ratio: f32) -> Self {
        self.config.quality.max_single_char_ratio = ratio;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `new_after_n_chars > max_characters`
    /// - `top_k == 0`
    /// - `score_threshold < 0`
    /// - `max_single_char_ratio` is outside `[0, 1]`
    pub fn build(self) -> Result<RagConfig> {
        let chunking = &self.config.chunking;
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }
        if chunking.new_after_n_chars > chunking.max_characters {
            return Err(RagError::Config(format!(
                "new_after_n_chars ({}) must not exceed max_characters ({})",
                chunking.new_after_n_chars, chunking.max_characters
            )));
        }
        if self.config.retrieval.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.retrieval.score_threshold < 0.0 {
            return Err(RagError::Config(format!(
                "score_threshold ({}) must be non-negative",
                self.config.retrieval.score_threshold
            )));
        }
        let ratio = self.config.quality.max_single_char_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(RagError::Config(format!(
                "max_single_char_ratio ({ratio}) must be within [0, 1]"
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.score_threshold, 0.7);
        assert_eq!(config.quality.min_chunk_chars, 100);
    }

    #[test]
    fn rejects_overlap_not_below_chunk_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = RagConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn rejects_negative_score_threshold() {
        let err = RagConfig::builder().score_threshold(-0.1).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn rejects_soft_limit_above_hard_cap() {
        let err =
            RagConfig::builder().max_characters(1000).new_after_n_chars(1200).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn deserializes_from_sectioned_input() {
        let raw = r#"{
            "chunking": {
                "strategy": "title",
                "max_characters": 1500,
                "new_after_n_chars": 1200,
                "combine_text_under_n_chars": 300,
                "chunk_size": 800,
                "chunk_overlap": 150
            },
            "retrieval": { "top_k": 3, "score_threshold": 0.5 },
            "quality": {
                "min_chunk_chars": 100,
                "min_page_chars": 50,
                "max_single_char_ratio": 0.3
            }
        }"#;
        let config: RagConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.chunking.strategy, ChunkStrategy::Title);
        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.retrieval.top_k, 3);
    }
}

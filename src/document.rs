//! Data types for content elements, chunks, retrieval results, and answers.

use serde::{Deserialize, Serialize};

/// The category of a parsed content element.
///
/// A closed set mirroring the element types produced by document parsing
/// engines. Unrecognized categories map to [`ElementKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// A section heading or document title.
    Title,
    /// A body text paragraph.
    Paragraph,
    /// A table rendered as text.
    Table,
    /// An image or figure caption.
    Caption,
    /// Any other element category.
    Other,
}

/// A raw unit of parsed document content.
///
/// Transient: exists only while a single document is being ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentElement {
    /// The extracted text, as produced by the parser (not yet normalized).
    pub text: String,
    /// The element category.
    pub kind: ElementKind,
    /// 1-based page number, if the parser reports one.
    pub page: Option<u32>,
}

/// A bounded unit of normalized document text with provenance metadata.
///
/// The atomic unit of storage and retrieval. A `Chunk` is only constructed
/// after its text has passed the quality gate; it is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Normalized, non-empty text.
    pub text: String,
    /// Originating document identifier (filename or caller-supplied name).
    pub source: String,
    /// 1-based page number, or `None` if unknown.
    pub page: Option<u32>,
    /// Position of this chunk among chunks derived from the same source.
    pub sequence_index: usize,
}

/// A retrieved [`Chunk`] paired with a distance score.
///
/// Distance is a non-negative dissimilarity score: lower means more similar.
/// This is the single score convention used throughout the crate; the inverse
/// "relevance" view exists only at presentation boundaries via
/// [`relevance`](ScoredChunk::relevance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Dissimilarity to the query embedding (ascending = more similar).
    pub distance: f32,
}

impl ScoredChunk {
    /// Relevance as `1 - distance`.
    ///
    /// Not re-clamped to `[0, 1]`; the retrieval threshold is the only bound
    /// applied to scores.
    pub fn relevance(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Provenance and relevance attribution for one source of an [`Answer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    /// Originating document identifier.
    pub source: String,
    /// 1-based page number, or `None` if unknown.
    pub page: Option<u32>,
    /// `1 - distance`, rounded to 3 decimal places.
    pub relevance: f32,
    /// The first 200 characters of the chunk text plus an ellipsis marker.
    pub content_preview: String,
}

/// The final structured answer to one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generated answer text, or a fixed no-evidence message.
    pub answer: String,
    /// Attribution for each chunk used as evidence, most relevant first.
    pub sources: Vec<SourceAttribution>,
    /// Number of chunks that survived relevance filtering.
    pub retrieved_docs: usize,
}

/// The outcome of ingesting one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of chunks that passed the quality gate and were indexed.
    pub chunks_created: usize,
}

/// Advisory statistics about the indexed corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Number of records currently in the vector index.
    pub document_count: usize,
}

//! # docrag
//!
//! Retrieval-augmented question answering over a private document corpus.
//!
//! The crate covers the ingestion-to-retrieval pipeline for a
//! single-operator QA assistant: documents are parsed into content
//! elements, normalized and quality-filtered into [`Chunk`]s, embedded and
//! stored in a vector index, then retrieved as distance-filtered evidence
//! that a generation backend turns into a cited [`Answer`].
//!
//! ## Architecture
//!
//! Every external collaborator is a capability trait, injected at
//! construction:
//!
//! - [`DocumentParser`] — file → ordered content elements
//! - [`Chunker`] — elements → quality-gated chunks ([`TitleChunker`],
//!   [`WindowChunker`])
//! - [`EmbeddingProvider`] — text → vector ([`openai`], [`ollama`])
//! - [`VectorStore`] — insert + nearest-neighbor search
//!   ([`InMemoryVectorStore`])
//! - [`GenerationProvider`] — prompt + evidence → answer text
//!
//! Scores follow one convention everywhere: **distance**, non-negative,
//! ascending = more similar. Relevance (`1 - distance`) appears only in
//! caller-facing output.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docrag::{
//!     BackendConfig, InMemoryVectorStore, PlainTextParser, RagConfig, RagPipeline,
//!     build_embedding_provider, build_generation_provider,
//! };
//!
//! let backend = BackendConfig::ollama();
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .parser(Arc::new(PlainTextParser::new()))
//!     .embedding_provider(build_embedding_provider(&backend)?)
//!     .generation_provider(build_generation_provider(&backend)?)
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! pipeline.ingest("reports/q3.txt", None).await?;
//! let answer = pipeline.query("What drove revenue growth?", None).await?;
//! println!("{}", answer.answer);
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod inmemory;
pub mod normalize;
pub mod ollama;
pub mod openai;
pub mod parser;
pub mod pipeline;
pub mod provider;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{Chunker, TitleChunker, WindowChunker, chunker_from_config};
pub use config::{ChunkStrategy, ChunkingConfig, QualityConfig, RagConfig, RetrievalConfig};
pub use document::{
    Answer, Chunk, ContentElement, CorpusStats, ElementKind, IngestReport, ScoredChunk,
    SourceAttribution,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::GenerationProvider;
pub use index::VectorIndex;
pub use inmemory::InMemoryVectorStore;
pub use normalize::clean_text;
pub use ollama::{OllamaEmbeddingProvider, OllamaGenerationProvider};
pub use openai::{OpenAiEmbeddingProvider, OpenAiGenerationProvider};
pub use parser::{DocumentParser, PlainTextParser};
pub use pipeline::{NO_EVIDENCE_ANSWER, RagPipeline, RagPipelineBuilder};
pub use provider::{BackendConfig, BackendKind, build_embedding_provider, build_generation_provider};
pub use retriever::Retriever;
pub use vectorstore::{EmbeddedChunk, VectorRecord, VectorStore};

//! Pipeline orchestrator: ingest documents, answer questions.
//!
//! The [`RagPipeline`] composes a [`DocumentParser`], a [`Chunker`], a
//! [`VectorIndex`], a [`Retriever`], and a [`GenerationProvider`] behind
//! the three outward operations: [`ingest`](RagPipeline::ingest),
//! [`query`](RagPipeline::query), and [`stats`](RagPipeline::stats).
//! All collaborators are injected at construction; there is no hidden
//! process-wide state.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docrag::{InMemoryVectorStore, PlainTextParser, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .parser(Arc::new(PlainTextParser::new()))
//!     .embedding_provider(embedder)
//!     .generation_provider(generator)
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! pipeline.ingest("report.pdf", None).await?;
//! let answer = pipeline.query("What drove revenue growth?", None).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::{Chunker, chunker_from_config};
use crate::config::RagConfig;
use crate::document::{Answer, CorpusStats, IngestReport, ScoredChunk, SourceAttribution};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;
use crate::index::VectorIndex;
use crate::parser::DocumentParser;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// Fixed answering instructions handed to the generation backend along
/// with the assembled evidence.
const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on \
provided documents.

IMPORTANT RULES:
1. Answer ONLY based on the provided documents
2. If the answer is not in the documents, say so clearly
3. Cite the relevant sources in your answer
4. Be precise and professional

Here are the relevant documents:";

/// The canned answer returned when no evidence survives filtering.
pub const NO_EVIDENCE_ANSWER: &str =
    "I could not find relevant information to answer your question.";

/// Number of characters kept in a source's content preview.
const PREVIEW_CHARS: usize = 200;

/// The ingestion-to-retrieval pipeline.
///
/// Write path: parse → chunk (with quality gate) → embed → store.
/// Read path: retrieve → assemble context → generate → package answer.
/// Queries are independent and read-only against the index, so concurrent
/// queries are safe; ingestion may run alongside them.
pub struct RagPipeline {
    config: RagConfig,
    parser: Arc<dyn DocumentParser>,
    chunker: Arc<dyn Chunker>,
    index: VectorIndex,
    generator: Arc<dyn GenerationProvider>,
    retriever: Retriever,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest one document: parse → chunk → embed → store.
    ///
    /// `source_name` defaults to the file name. A parser failure on
    /// malformed input is treated as zero elements: logged, reported as
    /// `chunks_created: 0`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Input`] when the path does not exist, and
    /// surfaces embedding or storage backend failures unmodified.
    pub async fn ingest(
        &self,
        path: impl AsRef<Path>,
        source_name: Option<&str>,
    ) -> Result<IngestReport> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RagError::Input {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }

        let source = source_name.map_or_else(
            || path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            str::to_string,
        );
        info!(source, path = %path.display(), "ingesting document");

        let elements = match self.parser.parse(path) {
            Ok(elements) => elements,
            Err(RagError::Parse { source_name, message }) => {
                warn!(source = source_name, message, "parse failed, treating as empty document");
                return Ok(IngestReport { chunks_created: 0 });
            }
            Err(e) => return Err(e),
        };

        let chunks = self.chunker.chunk(&source, &elements, &self.config.quality);
        let chunks_created = chunks.len();
        self.index.insert(chunks).await?;

        info!(source, chunks_created, "document ingested");
        Ok(IngestReport { chunks_created })
    }

    /// Ingest several documents, isolating failures per document.
    ///
    /// A document that fails for any reason (missing file, parse error,
    /// backend failure) is logged and reported as 0 chunks; the remaining
    /// documents are still ingested. Reports align with the input paths.
    pub async fn ingest_batch(&self, paths: &[impl AsRef<Path>]) -> Vec<IngestReport> {
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let report = match self.ingest(path, None).await {
                Ok(report) => report,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "ingestion failed, continuing batch");
                    IngestReport { chunks_created: 0 }
                }
            };
            reports.push(report);
        }
        reports
    }

    /// Answer a question from the indexed corpus.
    ///
    /// Retrieves evidence, and either short-circuits with the fixed
    /// no-evidence answer (no generation call is made) or assembles the
    /// context, invokes the generation backend once, and packages the
    /// answer with per-source attribution.
    ///
    /// # Errors
    ///
    /// Retrieval and generation backend failures propagate unmodified; a
    /// generation failure is never masked as "no evidence".
    pub async fn query(&self, question: &str, top_k: Option<usize>) -> Result<Answer> {
        info!(question, "processing question");

        let retrieved = self.retriever.retrieve(&self.index, question, top_k).await?;

        if retrieved.is_empty() {
            info!("no evidence survived filtering, skipping generation");
            return Ok(Answer {
                answer: NO_EVIDENCE_ANSWER.to_string(),
                sources: Vec::new(),
                retrieved_docs: 0,
            });
        }

        let context = self.retriever.format_context(&retrieved);
        let answer = self.generator.generate(SYSTEM_PROMPT, &context, question).await?;

        let sources = retrieved.iter().map(source_attribution).collect();
        info!(retrieved_docs = retrieved.len(), "answer generated");

        Ok(Answer { answer, sources, retrieved_docs: retrieved.len() })
    }

    /// Advisory corpus statistics.
    pub async fn stats(&self) -> CorpusStats {
        CorpusStats { document_count: self.index.count().await }
    }
}

fn source_attribution(result: &ScoredChunk) -> SourceAttribution {
    let mut preview: String = result.chunk.text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    SourceAttribution {
        source: result.chunk.source.clone(),
        page: result.chunk.page,
        relevance: (result.relevance() * 1000.0).round() / 1000.0,
        content_preview: preview,
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `parser`, `embedding_provider`, `generation_provider`, and
/// `vector_store` are required. `config` defaults to [`RagConfig::default`]
/// and the chunker is derived from the configured strategy unless
/// overridden.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    parser: Option<Arc<dyn DocumentParser>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document parser.
    pub fn parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Override the chunking strategy derived from the configuration.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required collaborator is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let parser =
            self.parser.ok_or_else(|| RagError::Config("parser is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| RagError::Config("generation_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;

        let chunker = self.chunker.unwrap_or_else(|| chunker_from_config(&config.chunking));
        let retriever = Retriever::new(&config.retrieval);
        let index = VectorIndex::new(embedding_provider, vector_store);

        Ok(RagPipeline { config, parser, chunker, index, generator: generation_provider, retriever })
    }
}

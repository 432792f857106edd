//! End-to-end pipeline tests with substitutable backends.
//!
//! The embedding and generation backends are test doubles: the embedder
//! maps marker words to fixed vectors so retrieval distances are exact,
//! and the generator counts invocations so the no-evidence short-circuit
//! is observable.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docrag::{
    EmbeddingProvider, GenerationProvider, InMemoryVectorStore, NO_EVIDENCE_ANSWER,
    PlainTextParser, RagConfig, RagError, RagPipeline, Result,
};
use tempfile::NamedTempFile;

/// Embeds text as a fixed unit vector chosen by marker word, counting calls.
///
/// Texts without a marker embed as `[1, 0]` — the same vector queries get,
/// so unmarked chunks sit at distance 0 from any query.
#[derive(Debug)]
struct MarkerEmbedder {
    rules: Vec<(&'static str, Vec<f32>)>,
    calls: AtomicUsize,
}

impl MarkerEmbedder {
    fn new(rules: Vec<(&'static str, Vec<f32>)>) -> Self {
        Self { rules, calls: AtomicUsize::new(0) }
    }

    fn plain() -> Self {
        Self::new(Vec::new())
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for MarkerEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for (marker, embedding) in &self.rules {
            if text.contains(marker) {
                return Ok(embedding.clone());
            }
        }
        Ok(vec![1.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Returns a fixed answer and counts invocations.
#[derive(Debug)]
struct CountingGenerator {
    calls: AtomicUsize,
}

impl CountingGenerator {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for CountingGenerator {
    async fn generate(&self, _system: &str, _context: &str, _question: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("Generated answer citing sources.".to_string())
    }
}

/// Always fails, as an unreachable generation backend would.
#[derive(Debug)]
struct FailingGenerator;

#[async_trait]
impl GenerationProvider for FailingGenerator {
    async fn generate(&self, _system: &str, _context: &str, _question: &str) -> Result<String> {
        Err(RagError::Generation {
            provider: "test".to_string(),
            message: "backend unreachable".to_string(),
        })
    }
}

fn pipeline(
    embedder: Arc<MarkerEmbedder>,
    generator: Arc<dyn GenerationProvider>,
) -> RagPipeline {
    RagPipeline::builder()
        .config(RagConfig::default())
        .parser(Arc::new(PlainTextParser::new()))
        .embedding_provider(embedder)
        .generation_provider(generator)
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap()
}

fn write_fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// A paragraph comfortably above the 100-character chunk minimum.
fn long_page(topic: &str) -> String {
    format!(
        "The {topic} section of the annual report describes sustained growth across \
         every operating segment, driven by renewed customer demand and disciplined \
         cost control throughout the fiscal year. Management expects the momentum \
         to continue into the next reporting period as capacity expansions come \
         online."
    )
}

#[tokio::test]
async fn ingest_counts_only_chunks_that_pass_the_quality_gate() {
    let embedder = Arc::new(MarkerEmbedder::plain());
    let pipeline = pipeline(embedder.clone(), Arc::new(CountingGenerator::new()));

    // Five candidate pages: three long enough to survive, two short ones
    // rejected for length.
    let content = [
        long_page("revenue"),
        "Too short to keep as a chunk of evidence.".to_string(),
        long_page("operations"),
        "Another fragment below the minimum length.".to_string(),
        long_page("outlook"),
    ]
    .join("\u{0C}");
    let file = write_fixture(&content);

    let report = pipeline.ingest(file.path(), None).await.unwrap();
    assert_eq!(report.chunks_created, 3);
    assert_eq!(pipeline.stats().await.document_count, 3);
}

#[tokio::test]
async fn ingest_of_missing_file_is_an_input_error() {
    let pipeline =
        pipeline(Arc::new(MarkerEmbedder::plain()), Arc::new(CountingGenerator::new()));
    let err = pipeline.ingest("/no/such/report.txt", None).await.unwrap_err();
    assert!(matches!(err, RagError::Input { .. }));
}

#[tokio::test]
async fn ingest_skips_embedding_when_nothing_survives() {
    let embedder = Arc::new(MarkerEmbedder::plain());
    let pipeline = pipeline(embedder.clone(), Arc::new(CountingGenerator::new()));

    let file = write_fixture("Just a stub page.\u{0C}And another stub.");
    let report = pipeline.ingest(file.path(), None).await.unwrap();

    assert_eq!(report.chunks_created, 0);
    // Empty chunk lists never reach the embedding backend.
    assert_eq!(embedder.call_count(), 0);
}

#[tokio::test]
async fn batch_ingestion_isolates_per_document_failures() {
    let pipeline =
        pipeline(Arc::new(MarkerEmbedder::plain()), Arc::new(CountingGenerator::new()));

    let good_first = write_fixture(&long_page("alpha"));
    let good_second = write_fixture(&long_page("beta"));
    let paths = vec![
        good_first.path().to_path_buf(),
        std::path::PathBuf::from("/no/such/report.txt"),
        good_second.path().to_path_buf(),
    ];

    let reports = pipeline.ingest_batch(&paths).await;
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].chunks_created, 1);
    assert_eq!(reports[1].chunks_created, 0);
    assert_eq!(reports[2].chunks_created, 1);
}

#[tokio::test]
async fn query_with_empty_corpus_short_circuits_without_generation() {
    let generator = Arc::new(CountingGenerator::new());
    let pipeline = pipeline(Arc::new(MarkerEmbedder::plain()), generator.clone());

    let answer = pipeline.query("What drove revenue growth?", None).await.unwrap();

    assert_eq!(answer.answer, NO_EVIDENCE_ANSWER);
    assert!(answer.sources.is_empty());
    assert_eq!(answer.retrieved_docs, 0);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn query_where_all_distances_exceed_threshold_behaves_like_empty_corpus() {
    // Chunks mentioning "zephyr" embed far from the default query vector:
    // cosine 0.1, distance 0.9, beyond the 0.7 threshold.
    let embedder =
        Arc::new(MarkerEmbedder::new(vec![("zephyr", vec![0.1, 0.994_987_4])]));
    let generator = Arc::new(CountingGenerator::new());
    let pipeline = pipeline(embedder, generator.clone());

    let file = write_fixture(&long_page("zephyr turbine"));
    let report = pipeline.ingest(file.path(), None).await.unwrap();
    assert_eq!(report.chunks_created, 1);

    let answer = pipeline.query("Completely unrelated question", None).await.unwrap();

    assert_eq!(answer.answer, NO_EVIDENCE_ANSWER);
    assert!(answer.sources.is_empty());
    assert_eq!(answer.retrieved_docs, 0);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn query_with_matching_chunk_reports_relevance_and_preview() {
    // Chunks mentioning "veridian" sit at cosine 0.8 from the query vector,
    // so distance 0.2 and relevance 0.8.
    let embedder = Arc::new(MarkerEmbedder::new(vec![("veridian", vec![0.8, 0.6])]));
    let generator = Arc::new(CountingGenerator::new());
    let pipeline = pipeline(embedder, generator.clone());

    let file = write_fixture(&long_page("veridian facility"));
    pipeline.ingest(file.path(), Some("q3-report")).await.unwrap();

    let answer = pipeline.query("How did the plant perform?", None).await.unwrap();

    assert_eq!(answer.retrieved_docs, 1);
    assert_eq!(answer.answer, "Generated answer citing sources.");
    assert_eq!(generator.call_count(), 1);

    let source = &answer.sources[0];
    assert_eq!(source.source, "q3-report");
    assert_eq!(source.page, Some(1));
    assert_eq!(source.relevance, 0.8);
    // Preview is the first 200 characters plus the ellipsis marker.
    assert!(source.content_preview.ends_with("..."));
    assert_eq!(source.content_preview.chars().count(), 203);
}

#[tokio::test]
async fn generation_failure_propagates_instead_of_masking_as_no_evidence() {
    let embedder = Arc::new(MarkerEmbedder::plain());
    let pipeline = pipeline(embedder, Arc::new(FailingGenerator));

    let file = write_fixture(&long_page("liquidity"));
    pipeline.ingest(file.path(), None).await.unwrap();

    let err = pipeline.query("What about liquidity?", None).await.unwrap_err();
    assert!(matches!(err, RagError::Generation { .. }));
}

#[tokio::test]
async fn repeated_ingestion_is_not_deduplicated() {
    let pipeline =
        pipeline(Arc::new(MarkerEmbedder::plain()), Arc::new(CountingGenerator::new()));

    let file = write_fixture(&long_page("archives"));
    pipeline.ingest(file.path(), None).await.unwrap();
    pipeline.ingest(file.path(), None).await.unwrap();

    assert_eq!(pipeline.stats().await.document_count, 2);
}

//! Generation provider trait for producing answer text from evidence.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates answer text from an instruction prompt,
/// assembled evidence, and a user question.
///
/// Implementations wrap specific chat backends (OpenAI, Ollama, etc.).
/// One call produces one answer; the core contract has no retries and no
/// streaming. Failures surface as
/// [`RagError::Generation`](crate::RagError::Generation) and are never
/// masked by the orchestrator.
#[async_trait]
pub trait GenerationProvider: Send + Sync + std::fmt::Debug {
    /// Generate an answer to `question` grounded in `context`.
    ///
    /// `system_prompt` carries the fixed answering instructions; `context`
    /// is the ordered evidence block rendered by the retriever.
    async fn generate(&self, system_prompt: &str, context: &str, question: &str)
    -> Result<String>;
}

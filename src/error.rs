//! Error types for the `docrag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the ingestion-to-retrieval pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// The input file is missing or unreadable.
    #[error("Input error ({path}): {message}")]
    Input {
        /// The path that could not be read.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A document could not be parsed into content elements.
    ///
    /// Non-fatal to batch ingestion: the pipeline treats this as
    /// "zero elements" for the affected document.
    #[error("Parse error ({source_name}): {message}")]
    Parse {
        /// The document that failed to parse.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding backend is unreachable or returned an error.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation backend is unreachable or returned an error.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector storage backend is unreachable or returned an error.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Backend credentials are missing or invalid.
    ///
    /// Surfaced when the backend factory runs, not deferred to first use.
    #[error("Auth error ({provider}): {message}")]
    Auth {
        /// The backend that rejected or lacked credentials.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;

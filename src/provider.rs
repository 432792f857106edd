//! Backend selection, resolved once at startup.
//!
//! The closed set of supported backends is [`BackendKind`]; the factories
//! here turn a [`BackendConfig`] into concrete capability objects. Adding a
//! provider means adding a variant and an arm in each factory, not
//! branching deep in call sites.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::generation::GenerationProvider;
use crate::ollama::{OllamaEmbeddingProvider, OllamaGenerationProvider};
use crate::openai::{OpenAiEmbeddingProvider, OpenAiGenerationProvider};

/// The closed set of supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// A local or remote Ollama server.
    Ollama,
    /// The OpenAI API.
    OpenAi,
}

/// Connection settings for one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Which backend to use.
    pub kind: BackendKind,
    /// Model name override; each backend has its own default.
    pub model: Option<String>,
    /// Embedding dimensionality; required when `model` overrides the
    /// default embedding model.
    pub dimensions: Option<usize>,
    /// Server base URL (Ollama) or API endpoint override (OpenAI).
    pub base_url: Option<String>,
    /// API key; OpenAI falls back to `OPENAI_API_KEY` when absent.
    pub api_key: Option<String>,
    /// Sampling temperature for generation.
    pub temperature: Option<f32>,
}

impl BackendConfig {
    /// Configuration for a default local Ollama server.
    pub fn ollama() -> Self {
        Self {
            kind: BackendKind::Ollama,
            model: None,
            dimensions: None,
            base_url: None,
            api_key: None,
            temperature: None,
        }
    }

    /// Configuration for the OpenAI API with an explicit key.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::OpenAi,
            model: None,
            dimensions: None,
            base_url: None,
            api_key: Some(api_key.into()),
            temperature: None,
        }
    }
}

/// Resolve a [`BackendConfig`] into an embedding capability.
///
/// # Errors
///
/// Returns [`RagError::Auth`](crate::RagError::Auth) when credentials are
/// missing or invalid — at startup, not on first use.
pub fn build_embedding_provider(config: &BackendConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    info!(kind = ?config.kind, "initializing embedding backend");
    match config.kind {
        BackendKind::Ollama => {
            let mut provider = OllamaEmbeddingProvider::new();
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url);
            }
            if let (Some(model), Some(dimensions)) = (&config.model, config.dimensions) {
                provider = provider.with_model(model, dimensions);
            }
            Ok(Arc::new(provider))
        }
        BackendKind::OpenAi => {
            let mut provider = match &config.api_key {
                Some(key) => OpenAiEmbeddingProvider::new(key.clone())?,
                None => OpenAiEmbeddingProvider::from_env()?,
            };
            if let Some(base_url) = &config.base_url {
                provider = provider.with_url(base_url);
            }
            if let (Some(model), Some(dimensions)) = (&config.model, config.dimensions) {
                provider = provider.with_model(model, dimensions);
            }
            Ok(Arc::new(provider))
        }
    }
}

/// Resolve a [`BackendConfig`] into a generation capability.
///
/// # Errors
///
/// Returns [`RagError::Auth`](crate::RagError::Auth) when credentials are
/// missing or invalid — at startup, not on first use.
pub fn build_generation_provider(config: &BackendConfig) -> Result<Arc<dyn GenerationProvider>> {
    info!(kind = ?config.kind, "initializing generation backend");
    match config.kind {
        BackendKind::Ollama => {
            let mut provider = OllamaGenerationProvider::new();
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url);
            }
            if let Some(model) = &config.model {
                provider = provider.with_model(model);
            }
            if let Some(temperature) = config.temperature {
                provider = provider.with_temperature(temperature);
            }
            Ok(Arc::new(provider))
        }
        BackendKind::OpenAi => {
            let mut provider = match &config.api_key {
                Some(key) => OpenAiGenerationProvider::new(key.clone())?,
                None => OpenAiGenerationProvider::from_env()?,
            };
            if let Some(base_url) = &config.base_url {
                provider = provider.with_url(base_url);
            }
            if let Some(model) = &config.model {
                provider = provider.with_model(model);
            }
            if let Some(temperature) = config.temperature {
                provider = provider.with_temperature(temperature);
            }
            Ok(Arc::new(provider))
        }
    }
}

//! Text embedding capability.
//!
//! The semantic index only sees the [`Embedder`] trait, so the provider can be
//! a sentence-transformer run in-process, a remote model behind an HTTP
//! endpoint, the hashing embedder, or a stub in tests.

pub mod hashing;
pub mod http;
pub mod local;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;
pub use local::LocalEmbedder;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Network or API communication error
    #[error("API request failed: {0}")]
    ApiError(String),

    /// Provider answered but the payload is unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid input text (e.g., empty)
    #[error("Invalid input text: {0}")]
    InvalidInput(String),

    /// Vector length differs from the provider's declared dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Configuration error (e.g., unusable endpoint)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Local model files missing or unreadable
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// Local forward pass failed
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}

pub type EmbeddingResult<T> = std::result::Result<T, EmbeddingError>;

/// Maps text to a fixed-length dense vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Embed several texts, output in input order.
    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Reject vectors whose length is not `expected`.
pub fn check_dimension(embedding: &[f32], expected: usize) -> EmbeddingResult<()> {
    if embedding.len() != expected {
        return Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: embedding.len(),
        });
    }
    Ok(())
}

/// Pick the provider described by the configuration
pub fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Local => {
            let embedder = LocalEmbedder::load(&config.model_dir, &config.model)?;
            if embedder.dimension() != config.dimension {
                warn!(
                    "Model {} produces {} dimensions, EMBEDDING_DIMENSION is {}; using the model's",
                    config.model,
                    embedder.dimension(),
                    config.dimension
                );
            }
            Ok(Arc::new(embedder))
        }
        EmbeddingProvider::Http => {
            let url = config.url.as_deref().ok_or_else(|| {
                EmbeddingError::ConfigError("The http provider requires EMBEDDING_URL".to_string())
            })?;
            info!("Using remote embedding model {} at {}", config.model, url);
            let embedder = HttpEmbedder::new(
                url,
                &config.model,
                config.api_key.clone(),
                config.dimension,
                Duration::from_secs(config.timeout_seconds),
            )?;
            Ok(Arc::new(embedder))
        }
        EmbeddingProvider::Hashing => {
            info!(
                "Using hashing embedder ({} dimensions); semantic results are keyword-based",
                config.dimension
            );
            Ok(Arc::new(HashingEmbedder::new(config.dimension)))
        }
    }
}

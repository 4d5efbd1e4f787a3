//! On-disk copy of the corpus embeddings, for faster restarts.
//!
//! The cache is keyed by a SHA-256 fingerprint of the model name, dimension and
//! every canonical recipe text, so any corpus or model change invalidates it.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingCache {
    pub model: String,
    pub dimension: usize,
    pub fingerprint: String,
    pub built_at: DateTime<Utc>,
    pub embeddings: Vec<Vec<f32>>,
}

/// Fingerprint of everything the embeddings depend on
pub fn fingerprint<S: AsRef<str>>(model: &str, dimension: usize, texts: &[S]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update((dimension as u64).to_le_bytes());
    for text in texts {
        hasher.update((text.as_ref().len() as u64).to_le_bytes());
        hasher.update(text.as_ref().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

impl EmbeddingCache {
    pub fn new(model: &str, dimension: usize, fingerprint: String, embeddings: Vec<Vec<f32>>) -> Self {
        Self {
            model: model.to_string(),
            dimension,
            fingerprint,
            built_at: Utc::now(),
            embeddings,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write via a temporary sibling file so readers never see a partial cache
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Usable for a corpus with this fingerprint and `count` recipes, every
    /// vector `dimension` long
    pub fn validate(&self, fingerprint: &str, count: usize, dimension: usize) -> Result<()> {
        if self.fingerprint != fingerprint {
            return Err(Error::Index("Embedding cache fingerprint mismatch".to_string()));
        }
        if self.dimension != dimension {
            return Err(Error::Index(format!(
                "Embedding cache built for {} dimensions, embedder has {}",
                self.dimension, dimension
            )));
        }
        if let Some(position) = self.embeddings.iter().position(|e| e.len() != dimension) {
            return Err(Error::Index(format!(
                "Embedding cache vector #{} has {} dimensions, expected {}",
                position,
                self.embeddings[position].len(),
                dimension
            )));
        }
        if self.embeddings.len() != count {
            return Err(Error::Index(format!(
                "Embedding cache holds {} vectors for {} recipes",
                self.embeddings.len(),
                count
            )));
        }
        Ok(())
    }
}

// Semantic recommendation: one embedding per recipe, exact L2 search

pub mod cache;
pub mod flat;

use crate::corpus::Corpus;
use crate::embedding::Embedder;
use crate::error::{Error, Result};
use cache::EmbeddingCache;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use flat::{FlatL2Index, Neighbor};

pub struct SemanticIndex {
    embedder: Arc<dyn Embedder>,
    index: FlatL2Index,
}

impl SemanticIndex {
    /// Embed every recipe's canonical text. Any provider failure is fatal here.
    pub async fn build(
        corpus: &Corpus,
        embedder: Arc<dyn Embedder>,
        batch_size: usize,
    ) -> Result<Self> {
        Self::build_cached(corpus, embedder, batch_size, None).await
    }

    /// Like [`SemanticIndex::build`], reusing embeddings from `cache_path`
    /// when they were computed for the same corpus and model.
    pub async fn build_cached(
        corpus: &Corpus,
        embedder: Arc<dyn Embedder>,
        batch_size: usize,
        cache_path: Option<&Path>,
    ) -> Result<Self> {
        let texts: Vec<String> = corpus.iter().map(|r| r.canonical_text()).collect();
        let dimension = embedder.dimension();
        let print = cache::fingerprint(embedder.model_name(), dimension, &texts);

        let cached = cache_path.and_then(|path| {
            if !path.exists() {
                debug!("No embedding cache at {:?} yet", path);
                return None;
            }
            let loaded = EmbeddingCache::load(path)
                .and_then(|c| c.validate(&print, texts.len(), dimension).map(|_| c));
            match loaded {
                Ok(c) => {
                    info!("Loaded {} embeddings from cache {:?}", c.embeddings.len(), path);
                    Some(c.embeddings)
                }
                Err(e) => {
                    warn!("Ignoring embedding cache {:?}: {}", path, e.log_safe());
                    None
                }
            }
        });

        let embeddings = match cached {
            Some(embeddings) => embeddings,
            None => {
                let embeddings = embed_all(embedder.as_ref(), &texts, batch_size).await?;
                if let Some(path) = cache_path {
                    let cache =
                        EmbeddingCache::new(embedder.model_name(), dimension, print, embeddings);
                    if let Err(e) = cache.save(path) {
                        warn!("Failed to write embedding cache {:?}: {}", path, e.log_safe());
                    }
                    cache.embeddings
                } else {
                    embeddings
                }
            }
        };

        let mut index = FlatL2Index::new(dimension);
        for (position, embedding) in embeddings.iter().enumerate() {
            index.add(embedding).map_err(|e| {
                Error::Index(format!("Embedding for recipe #{position} rejected: {e}"))
            })?;
        }

        info!(
            "Semantic index built: {} recipes, {} dimensions ({})",
            index.len(),
            dimension,
            embedder.model_name()
        );

        Ok(Self { embedder, index })
    }

    /// Nearest recipes to `query`, closest first. Provider failures are
    /// logged and yield no results.
    pub async fn search(&self, query: &str, top_n: usize) -> Vec<Neighbor> {
        if query.trim().is_empty() || top_n == 0 {
            return Vec::new();
        }

        let embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Semantic query embedding failed: {}", e);
                return Vec::new();
            }
        };

        match self.index.search(&embedding, top_n) {
            Ok(neighbors) => neighbors,
            Err(e) => {
                warn!("Semantic query rejected: {}", e);
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    pub fn embedding(&self, index: usize) -> Option<&[f32]> {
        self.index.vector(index)
    }
}

async fn embed_all(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
        let vectors = embedder.embed_batch(&refs).await?;
        if vectors.len() != refs.len() {
            return Err(Error::Index(format!(
                "Embedder returned {} vectors for {} texts",
                vectors.len(),
                refs.len()
            )));
        }
        embeddings.extend(vectors);
        debug!("Embedded {}/{} recipes", embeddings.len(), texts.len());
    }
    Ok(embeddings)
}

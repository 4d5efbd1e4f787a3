use crate::config::{EmbeddingConfig, EngineConfig};
use crate::corpus::{Corpus, IngredientExtractor, RecipeSummary, Vocabulary};
use crate::embedding::Embedder;
use crate::error::Result;
use crate::lexical::LexicalIndex;
use crate::semantic::SemanticIndex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The recipe retrieval engine.
///
/// Built once from a corpus and read-only afterwards, so a single instance can
/// be shared behind an `Arc` by any number of concurrent callers.
pub struct Engine {
    corpus: Corpus,
    vocabulary: Vocabulary,
    extractor: IngredientExtractor,
    lexical: LexicalIndex,
    semantic: SemanticIndex,
    config: EngineConfig,
}

/// Sizes of the built structures, reported by `/api/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub recipes: usize,
    pub vocabulary: usize,
    pub lexical_features: usize,
    pub embedding_dimension: usize,
    pub embedding_model: String,
}

impl Engine {
    pub async fn build(
        corpus: Corpus,
        embedder: Arc<dyn Embedder>,
        config: &EngineConfig,
        embedding: &EmbeddingConfig,
    ) -> Result<Self> {
        let vocabulary = Vocabulary::build(&corpus);
        let extractor = IngredientExtractor::new(&vocabulary)?;
        let lexical = LexicalIndex::build(&corpus, config);
        let semantic = SemanticIndex::build_cached(
            &corpus,
            embedder,
            embedding.batch_size,
            embedding.cache_path.as_deref(),
        )
        .await?;

        info!(
            "Engine ready: {} recipes, {} known ingredients",
            corpus.len(),
            vocabulary.len()
        );

        Ok(Self {
            corpus,
            vocabulary,
            extractor,
            lexical,
            semantic,
            config: config.clone(),
        })
    }

    fn clamp(&self, top_n: usize) -> usize {
        top_n.min(self.config.max_top_n)
    }

    /// Recipes whose ingredients best match `ingredients`, best first.
    pub fn recommend<S: AsRef<str>>(&self, ingredients: &[S], top_n: usize) -> Vec<RecipeSummary> {
        let matches = self.lexical.rank(ingredients, self.clamp(top_n));
        debug!("Lexical query matched {} recipes", matches.len());

        matches
            .into_iter()
            .filter_map(|m| self.summary(m.index))
            .collect()
    }

    /// Extract known ingredients from free text, then [`Engine::recommend`].
    pub fn recommend_text(&self, text: &str, top_n: usize) -> Vec<RecipeSummary> {
        let ingredients: Vec<String> = self.extract_ingredients(text).into_iter().collect();
        if ingredients.is_empty() {
            return Vec::new();
        }
        self.recommend(&ingredients, top_n)
    }

    /// Recipes semantically closest to `query`, closest first.
    pub async fn semantic_recommend(&self, query: &str, top_n: usize) -> Vec<RecipeSummary> {
        let neighbors = self.semantic.search(query, self.clamp(top_n)).await;
        debug!("Semantic query matched {} recipes", neighbors.len());

        neighbors
            .into_iter()
            .filter_map(|n| self.summary(n.index))
            .collect()
    }

    pub fn extract_ingredients(&self, text: &str) -> BTreeSet<String> {
        self.extractor.extract(text)
    }

    fn summary(&self, index: usize) -> Option<RecipeSummary> {
        match self.corpus.get(index) {
            Ok(recipe) => Some(recipe.summary()),
            Err(e) => {
                warn!("Skipping candidate: {}", e);
                None
            }
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn semantic(&self) -> &SemanticIndex {
        &self.semantic
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            recipes: self.corpus.len(),
            vocabulary: self.vocabulary.len(),
            lexical_features: self.lexical.feature_count(),
            embedding_dimension: self.semantic.dimension(),
            embedding_model: self.semantic.model_name().to_string(),
        }
    }
}

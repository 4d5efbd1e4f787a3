// Lexical recommendation: TF-IDF over ingredient text, ranked by cosine

pub mod tokenizer;
pub mod vectorizer;

use crate::config::EngineConfig;
use crate::corpus::Corpus;
use serde::Serialize;
use tracing::debug;

pub use vectorizer::{SparseVector, TfidfVectorizer};

/// One ranked candidate: corpus position and cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LexicalMatch {
    pub index: usize,
    pub similarity: f64,
}

pub struct LexicalIndex {
    vectorizer: TfidfVectorizer,
    vectors: Vec<SparseVector>,
    threshold: f64,
}

impl LexicalIndex {
    /// Fit the model over every recipe's ingredient text
    pub fn build(corpus: &Corpus, config: &EngineConfig) -> Self {
        let documents: Vec<String> = corpus.iter().map(|r| r.ingredient_text()).collect();
        let (vectorizer, vectors) =
            TfidfVectorizer::fit_transform(&documents, config.max_features);

        debug!(
            "Lexical index built: {} recipes, {} features",
            vectors.len(),
            vectorizer.feature_count()
        );

        Self {
            vectorizer,
            vectors,
            threshold: config.similarity_threshold,
        }
    }

    fn project<S: AsRef<str>>(&self, tokens: &[S]) -> SparseVector {
        let text = tokens
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        self.vectorizer.transform(&text)
    }

    /// Top `top_n` recipes by cosine similarity, ties by corpus position,
    /// keeping only those strictly above the threshold.
    pub fn rank<S: AsRef<str>>(&self, tokens: &[S], top_n: usize) -> Vec<LexicalMatch> {
        if tokens.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let query = self.project(tokens);
        if query.is_empty() {
            debug!("Query has no terms in the fitted vocabulary");
            return Vec::new();
        }

        let mut scored: Vec<LexicalMatch> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, vector)| LexicalMatch {
                index,
                similarity: query.cosine(vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.index.cmp(&b.index))
        });
        scored.truncate(top_n);
        scored.retain(|m| m.similarity > self.threshold);
        scored
    }

    /// Cosine similarity between the query tokens and one recipe.
    pub fn similarity<S: AsRef<str>>(&self, tokens: &[S], index: usize) -> Option<f64> {
        let vector = self.vectors.get(index)?;
        Some(self.project(tokens).cosine(vector))
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.vectorizer.feature_count()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

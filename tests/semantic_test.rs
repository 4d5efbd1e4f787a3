// Integration tests for the semantic path: exact search, caching and degradation

use async_trait::async_trait;
use recommender::config::{EmbeddingConfig, EngineConfig};
use recommender::corpus::Corpus;
use recommender::embedding::{Embedder, EmbeddingError, EmbeddingResult, HashingEmbedder};
use recommender::semantic::cache::{fingerprint, EmbeddingCache};
use recommender::semantic::{flat::squared_l2, SemanticIndex};
use recommender::{Engine, Error};
use std::path::PathBuf;
use std::sync::Arc;

fn corpus() -> Corpus {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/recipes.json");
    Corpus::load(path).unwrap()
}

/// Embeds corpus batches fine but cannot serve single queries.
struct QueryOutage {
    inner: HashingEmbedder,
}

#[async_trait]
impl Embedder for QueryOutage {
    async fn embed(&self, _text: &str) -> EmbeddingResult<Vec<f32>> {
        Err(EmbeddingError::ApiError("connection reset".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.inner.embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        "query-outage"
    }
}

/// Fails every call, under whatever model name it is given.
struct Offline {
    model: String,
    dimension: usize,
}

impl Offline {
    fn new(model: &str, dimension: usize) -> Self {
        Self {
            model: model.to_string(),
            dimension,
        }
    }
}

#[async_trait]
impl Embedder for Offline {
    async fn embed(&self, _text: &str) -> EmbeddingResult<Vec<f32>> {
        Err(EmbeddingError::ApiError("provider unreachable".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[tokio::test]
async fn test_search_orders_by_distance() {
    let embedder = HashingEmbedder::new(64);
    let index = SemanticIndex::build(&corpus(), Arc::new(embedder.clone()), 4)
        .await
        .unwrap();

    let query = "quick spicy rice dinner";
    let neighbors = index.search(query, 3).await;
    assert_eq!(neighbors.len(), 3);

    let query_vector = embedder.embed_text(query);
    for n in &neighbors {
        let stored = index.embedding(n.index).unwrap();
        assert!((squared_l2(&query_vector, stored) - n.distance).abs() < 1e-4);
    }
    for window in neighbors.windows(2) {
        assert!(window[0].distance <= window[1].distance);
    }

    // No unreturned recipe is strictly closer than the last one returned
    let worst = neighbors[2].distance;
    for i in 0..index.len() {
        if neighbors.iter().any(|n| n.index == i) {
            continue;
        }
        let d = squared_l2(&query_vector, index.embedding(i).unwrap());
        assert!(d >= worst - 1e-4);
    }

    assert_eq!(index.search(query, 3).await, neighbors);
}

#[tokio::test]
async fn test_blank_query_returns_nothing() {
    let index = SemanticIndex::build(&corpus(), Arc::new(HashingEmbedder::new(16)), 64)
        .await
        .unwrap();
    assert!(index.search("", 3).await.is_empty());
    assert!(index.search("   ", 3).await.is_empty());
}

#[tokio::test]
async fn test_top_n_larger_than_corpus() {
    let corpus = corpus();
    let index = SemanticIndex::build(&corpus, Arc::new(HashingEmbedder::new(16)), 64)
        .await
        .unwrap();
    assert_eq!(index.search("pasta", 100).await.len(), corpus.len());
}

#[tokio::test]
async fn test_query_failure_degrades_to_empty() {
    let engine = Engine::build(
        corpus(),
        Arc::new(QueryOutage {
            inner: HashingEmbedder::new(32),
        }),
        &EngineConfig::default(),
        &EmbeddingConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(engine.semantic().len(), engine.corpus().len());
    assert!(engine.semantic_recommend("garlic pasta", 3).await.is_empty());

    // The lexical path is unaffected
    assert!(!engine.recommend(&["garlic", "pasta"], 3).is_empty());
}

#[tokio::test]
async fn test_build_failure_is_fatal() {
    let result = Engine::build(
        corpus(),
        Arc::new(Offline::new("offline", 8)),
        &EngineConfig::default(),
        &EmbeddingConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(Error::Capability(_))));
}

#[tokio::test]
async fn test_cache_round_trip_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let config = EmbeddingConfig {
        cache_path: Some(dir.path().join("embeddings.json")),
        ..EmbeddingConfig::default()
    };

    let first = Engine::build(
        corpus(),
        Arc::new(HashingEmbedder::new(32)),
        &EngineConfig::default(),
        &config,
    )
    .await
    .unwrap();
    assert!(dir.path().join("embeddings.json").exists());

    // Same model and corpus: served from the cache without calling the provider
    let second = Engine::build(
        corpus(),
        Arc::new(Offline::new("hashing-32", 32)),
        &EngineConfig::default(),
        &config,
    )
    .await
    .unwrap();
    assert_eq!(second.semantic().len(), first.semantic().len());
    assert_eq!(second.semantic().embedding(0), first.semantic().embedding(0));

    // A different model invalidates the cache
    let third = Engine::build(
        corpus(),
        Arc::new(Offline::new("other-model", 32)),
        &EngineConfig::default(),
        &config,
    )
    .await;
    assert!(third.is_err());
}

#[tokio::test]
async fn test_cache_with_wrong_dimension_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("embeddings.json");
    let corpus = corpus();
    let embedder = HashingEmbedder::new(8);

    let texts: Vec<String> = corpus.iter().map(|r| r.canonical_text()).collect();
    let print = fingerprint(embedder.model_name(), 8, &texts);
    EmbeddingCache::new(embedder.model_name(), 8, print, vec![vec![0.5; 3]; corpus.len()])
        .save(&path)
        .unwrap();

    let config = EmbeddingConfig {
        cache_path: Some(path.clone()),
        ..EmbeddingConfig::default()
    };
    let engine = Engine::build(
        corpus,
        Arc::new(embedder.clone()),
        &EngineConfig::default(),
        &config,
    )
    .await
    .unwrap();

    assert_eq!(engine.semantic().dimension(), 8);
    assert_eq!(
        engine.semantic().embedding(0),
        Some(embedder.embed_text(&engine.corpus().get(0).unwrap().canonical_text()).as_slice())
    );
    assert!(!engine.semantic_recommend("garlic pasta", 3).await.is_empty());
}

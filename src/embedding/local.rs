//! In-process sentence embeddings with Candle.
//!
//! Loads a BERT sentence-transformer (`all-MiniLM-L6-v2` by default) from a
//! directory holding `config.json`, `tokenizer.json` and `model.safetensors`,
//! then embeds with attention-masked mean pooling and L2 normalization, the
//! same recipe sentence-transformers uses for this model family.

use super::{check_dimension, Embedder, EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Longest input, in tokens; MiniLM was trained on 256-token sequences.
const MAX_SEQUENCE_LENGTH: usize = 256;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// The part of `config.json` needed before the model is built.
#[derive(Debug, Deserialize)]
struct ModelShape {
    hidden_size: usize,
}

struct LocalModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

/// Sentence-transformer embedder running on the CPU.
///
/// Inference is CPU-bound, so every call runs on the blocking thread pool.
#[derive(Clone)]
pub struct LocalEmbedder {
    inner: Arc<LocalModel>,
    model_name: String,
}

impl LocalEmbedder {
    pub fn load<P: AsRef<Path>>(model_dir: P, model_name: &str) -> EmbeddingResult<Self> {
        let model_dir = model_dir.as_ref();
        info!("Loading embedding model '{}' from {:?}", model_name, model_dir);

        let read = |file: &str| {
            let path = model_dir.join(file);
            fs::read(&path).map_err(|e| {
                EmbeddingError::ModelLoad(format!("Failed to read {}: {}", path.display(), e))
            })
        };

        let config_bytes = read(CONFIG_FILE)?;
        let shape: ModelShape = serde_json::from_slice(&config_bytes)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Invalid {CONFIG_FILE}: {e}")))?;
        let config: Config = serde_json::from_slice(&config_bytes)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Invalid {CONFIG_FILE}: {e}")))?;

        let mut tokenizer = Tokenizer::from_bytes(read(TOKENIZER_FILE)?).map_err(|e| {
            EmbeddingError::ModelLoad(format!("Failed to deserialize tokenizer: {e}"))
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| {
                EmbeddingError::ModelLoad(format!("Failed to configure tokenizer truncation: {e}"))
            })?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        // Weights are converted to F32 at load time
        let device = Device::Cpu;
        let vb = VarBuilder::from_buffered_safetensors(read(WEIGHTS_FILE)?, DType::F32, &device)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Failed to create VarBuilder: {e}")))?;
        let model = BertModel::load(vb, &config)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Failed to create BertModel: {e}")))?;

        info!(
            "Embedding model ready: {} dimensions, vocabulary of {}",
            shape.hidden_size,
            tokenizer.get_vocab_size(true)
        );

        Ok(Self {
            inner: Arc::new(LocalModel {
                model,
                tokenizer,
                device,
                dimension: shape.hidden_size,
            }),
            model_name: model_name.to_string(),
        })
    }
}

impl LocalModel {
    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let inference = |e: candle_core::Error| EmbeddingError::InferenceFailed(e.to_string());

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::InvalidInput(format!("Tokenization failed: {e}")))?;

        let batch = encodings.len();
        let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);
        if seq_len == 0 {
            return Err(EmbeddingError::InvalidInput("Nothing to embed".to_string()));
        }
        debug!("Embedding {} texts padded to {} tokens", batch, seq_len);

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut type_ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            type_ids.extend_from_slice(encoding.get_type_ids());
            mask.extend_from_slice(encoding.get_attention_mask());
        }

        let ids = Tensor::from_vec(ids, (batch, seq_len), &self.device).map_err(inference)?;
        let type_ids =
            Tensor::from_vec(type_ids, (batch, seq_len), &self.device).map_err(inference)?;
        let mask = Tensor::from_vec(mask, (batch, seq_len), &self.device).map_err(inference)?;

        // [batch, seq_len] -> [batch, seq_len, hidden]
        let hidden = self
            .model
            .forward(&ids, &type_ids, Some(&mask))
            .map_err(inference)?;

        // Mean over real tokens only: [batch, seq_len, hidden] -> [batch, hidden]
        let mask = mask.to_dtype(DType::F32).map_err(inference)?.unsqueeze(2).map_err(inference)?;
        let summed = hidden.broadcast_mul(&mask).map_err(inference)?.sum(1).map_err(inference)?;
        let counts = mask.sum(1).map_err(inference)?;
        let pooled = summed.broadcast_div(&counts).map_err(inference)?;

        let norms = pooled
            .sqr()
            .map_err(inference)?
            .sum_keepdim(1)
            .map_err(inference)?
            .sqrt()
            .map_err(inference)?;
        let normalized = pooled.broadcast_div(&norms).map_err(inference)?;

        let embeddings = normalized.to_vec2::<f32>().map_err(inference)?;
        for embedding in &embeddings {
            check_dimension(embedding, self.dimension)?;
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InferenceFailed("No embedding produced".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingError::InvalidInput(
                "All texts must be non-empty".to_string(),
            ));
        }

        let model = Arc::clone(&self.inner);
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        tokio::task::spawn_blocking(move || model.embed_batch(&texts))
            .await
            .map_err(|e| EmbeddingError::InferenceFailed(format!("Embedding task failed: {e}")))?
    }

    fn dimension(&self) -> usize {
        self.inner.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

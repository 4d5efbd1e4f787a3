use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// POST /api/ml-recommend body
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientsRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// POST /api/nl-recommend and /api/semantic-recommend body
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// POST /api/extract body
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub ingredients: BTreeSet<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub recipes: usize,
    pub lexical_index: String,
    pub semantic_index: String,
}

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    api::models::*,
    corpus::{Recipe, RecipeSummary},
    engine::{Engine, EngineStats},
    Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub settings: crate::config::Settings,
}

impl AppState {
    fn top_n(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.settings.engine.default_top_n)
    }
}

/// GET /api/recipes - The whole corpus
pub async fn list_recipes(State(state): State<AppState>) -> Json<Vec<Recipe>> {
    Json(state.engine.corpus().recipes().to_vec())
}

/// GET /api/recipes/:id - One recipe by corpus position
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<usize>,
) -> Result<Json<Recipe>> {
    debug!("Get recipe request: {}", id);
    Ok(Json(state.engine.corpus().get(id)?.clone()))
}

/// POST /api/ml-recommend - Rank recipes by ingredient overlap
pub async fn ml_recommend(
    State(state): State<AppState>,
    Json(request): Json<IngredientsRequest>,
) -> Json<Vec<RecipeSummary>> {
    debug!("Ingredient recommendation request: {:?}", request);
    let top_n = state.top_n(request.top_n);
    Json(state.engine.recommend(&request.ingredients, top_n))
}

/// POST /api/nl-recommend - Extract ingredients from text, then rank
pub async fn nl_recommend(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<Vec<RecipeSummary>> {
    debug!("Free-text recommendation request: {:?}", request);
    let top_n = state.top_n(request.top_n);
    Json(state.engine.recommend_text(&request.query, top_n))
}

/// POST /api/semantic-recommend - Nearest recipes by embedding
pub async fn semantic_recommend(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<Vec<RecipeSummary>> {
    debug!("Semantic recommendation request: {:?}", request);
    let top_n = state.top_n(request.top_n);
    Json(state.engine.semantic_recommend(&request.query, top_n).await)
}

/// POST /api/extract - Known ingredients mentioned in text
pub async fn extract_ingredients(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    Json(ExtractResponse {
        ingredients: state.engine.extract_ingredients(&request.text),
    })
}

/// GET /api/stats - Index statistics
pub async fn get_stats(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.stats())
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let recipes = state.engine.corpus().len();
    let lexical_ok = state.engine.lexical().len() == recipes;
    let semantic_ok = state.engine.semantic().len() == recipes;

    Json(ReadinessResponse {
        ready: recipes > 0 && lexical_ok && semantic_ok,
        recipes,
        lexical_index: if lexical_ok { "ok" } else { "error" }.to_string(),
        semantic_index: if semantic_ok { "ok" } else { "error" }.to_string(),
    })
}

//! API Routes
//! Mission: Expose look generation to the storefront

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::looks::LookService;
use crate::models::LooksResponse;

/// Default look count when the query string leaves it out.
const DEFAULT_NUM_LOOKS: usize = 3;

#[derive(Clone)]
pub struct AppState {
    pub looks: Arc<LookService>,
}

#[derive(Debug, Deserialize)]
pub struct LooksQuery {
    pub num_looks: Option<usize>,
}

/// Generate looks around an anchor SKU.
pub async fn generate_looks(
    Path(anchor_sku): Path<String>,
    Query(params): Query<LooksQuery>,
    State(state): State<AppState>,
) -> Result<Json<LooksResponse>, StatusCode> {
    let num_looks = params.num_looks.unwrap_or(DEFAULT_NUM_LOOKS);

    let response = state
        .looks
        .generate(&anchor_sku, num_looks)
        .await
        .map_err(|e| {
            warn!(anchor = %anchor_sku, error = %e, "look generation failed");
            e.status_code()
        })?;

    // Cached responses are frozen; hand the transport its own copy.
    Ok(Json(response.as_ref().clone()))
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/looks/:sku", get(generate_looks))
        .with_state(state)
}

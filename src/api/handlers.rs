//! Route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::error::Error;
use crate::search::{SearchRequest, SearchResponse};
use crate::taxonomy::TaxonomyCatalog;

/// Health response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime: u64,
}

/// `POST /search`
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        limiter.check()?;
    }

    let Json(request) = payload.map_err(|e| Error::MalformedRequest(e.body_text()))?;
    let response = state.engine.search(request).await?;
    Ok(Json(response))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
    })
}

/// `GET /taxonomy`
pub async fn taxonomy() -> Json<TaxonomyCatalog> {
    Json(TaxonomyCatalog::current())
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(metrics) => metrics.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

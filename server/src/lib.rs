use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use search_core::{DocId, EngineConfig, RelatedDoc, SearchEngine, SearchError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
}

#[derive(Serialize)]
pub struct RelatedResponse {
    pub doc_id: DocId,
    pub related: Vec<RelatedDoc>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

pub fn build_app(config: EngineConfig) -> Result<Router> {
    let engine = SearchEngine::new(config);
    engine.check_resources();
    let app_state = AppState { engine: Arc::new(engine) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id/related", get(related_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let query = params.q.trim().to_string();
    let hits = state.engine.search(&query, params.k).map_err(|err| {
        tracing::warn!(query = %query, error = %err, "search failed");
        api_error(&err)
    })?;
    let results: Vec<SearchHit> = hits
        .into_iter()
        .map(|hit| SearchHit { doc_id: hit.doc_id, score: hit.score, title: state.engine.title_of(hit.doc_id) })
        .collect();
    Ok(Json(SearchResponse { query, took_s: start.elapsed().as_secs_f64(), total_hits: results.len(), results }))
}

/// Lookup failures other than an unknown document degrade to an empty list.
pub async fn related_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<RelatedResponse>, ApiError> {
    let related = match state.engine.related(doc_id) {
        Ok(related) => related,
        Err(err @ SearchError::UnknownDocument(_)) => return Err(api_error(&err)),
        Err(err) => {
            tracing::warn!(doc_id, error = %err, "related lookup failed");
            Vec::new()
        }
    };
    Ok(Json(RelatedResponse { doc_id, related }))
}

fn api_error(err: &SearchError) -> ApiError {
    let status = match err {
        SearchError::EmptyQuery | SearchError::InvalidConfig { .. } => StatusCode::BAD_REQUEST,
        SearchError::NotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::UnknownDocument(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

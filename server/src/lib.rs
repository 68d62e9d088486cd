use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use docsearch_core::tokenizer::normalize;
use docsearch_core::SearchIndex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Deserialize)]
pub struct SuggestParams {
    pub prefix: String,
    #[serde(default = "default_k")]
    pub k: usize,
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
    pub doc: String,
    pub title: String,
}

#[derive(Serialize)]
pub struct LookupResponse {
    pub term: String,
    pub docs: Vec<String>,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub prefix: String,
    pub terms: Vec<String>,
}

/// The index is immutable once loaded, so handlers share it without locks.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<SearchIndex>,
}

pub fn build_app(index_path: &str) -> Result<Router> {
    let index = SearchIndex::open(index_path)?;
    Ok(router(Arc::new(index)))
}

pub fn router(index: Arc<SearchIndex>) -> Router {
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

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/lookup/:term", get(lookup_handler))
        .route("/suggest", get(suggest_handler))
        .route("/doc/*name", get(doc_handler))
        .with_state(AppState { index })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn clamp_k(k: usize) -> usize { k.clamp(1, 100) }

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let hits = state.index.hits(&params.q);
    let total_hits = hits.len();
    let results = hits
        .into_iter()
        .take(clamp_k(params.k))
        .map(|h| SearchHit { doc: h.doc.to_string(), title: h.title.to_string() })
        .collect();
    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits, "search served");
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results })
}

/// The path segment is normalized like a query, so `/lookup/CICS` finds `cics`.
/// Segments that normalize to several words match nothing.
pub async fn lookup_handler(State(state): State<AppState>, Path(raw): Path<String>) -> Json<LookupResponse> {
    let term = normalize(&raw);
    let docs = state.index.lookup(&term).into_iter().map(str::to_string).collect();
    Json(LookupResponse { term, docs })
}

pub async fn suggest_handler(State(state): State<AppState>, Query(params): Query<SuggestParams>) -> Json<SuggestResponse> {
    let terms = state
        .index
        .prefix(&params.prefix, clamp_k(params.k))
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(SuggestResponse { prefix: params.prefix, terms })
}

pub async fn doc_handler(State(state): State<AppState>, Path(name): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
    match state.index.title_of(&name) {
        Ok(title) => (StatusCode::OK, Json(serde_json::json!({ "doc": name, "title": title }))),
        Err(e) => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": e.to_string() }))),
    }
}

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use polysearch_core::{DocId, Language, ProcessedQuery, SearchConfig, SearchEngine, SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinError;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    /// Falls back to `search.default_results`.
    pub k: Option<usize>,
}

#[derive(Deserialize)]
pub struct TextParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Serialize)]
pub struct ProcessedResponse {
    pub query: String,
    #[serde(flatten)]
    pub processed: ProcessedQuery,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub word: String,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    pub title: String,
    pub url: String,
    pub content: String,
    pub language: Language,
    pub length: usize,
}

/// Shared handler state. The engine is immutable; a reload builds a new one
/// and swaps the pointer, so in-flight requests finish on the old snapshot.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<RwLock<Arc<SearchEngine>>>,
    config: Arc<SearchConfig>,
    admin_token: Option<String>,
}

impl AppState {
    pub fn new(engine: SearchEngine, config: SearchConfig, admin_token: Option<String>) -> Self {
        Self { engine: Arc::new(RwLock::new(Arc::new(engine))), config: Arc::new(config), admin_token }
    }

    pub fn engine(&self) -> Arc<SearchEngine> {
        self.engine.read().clone()
    }

    fn swap(&self, engine: SearchEngine) {
        *self.engine.write() = Arc::new(engine);
    }
}

/// A `SearchError` rendered as `{ "error": ..., "kind": ... }`.
pub struct ApiError {
    status: StatusCode,
    message: String,
    kind: &'static str,
}

impl ApiError {
    fn unauthorized(message: &str) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, message: message.into(), kind: "Unauthorized" }
    }

    fn not_found(message: String) -> Self {
        Self { status: StatusCode::NOT_FOUND, message, kind: "NotFound" }
    }
}

/// A blocking task that panicked or was cancelled.
fn worker_failed(err: JoinError) -> ApiError {
    ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: err.to_string(), kind: "WorkerFailed" }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let status = match &err {
            SearchError::LeadingOperator(_) | SearchError::Config(_) => StatusCode::BAD_REQUEST,
            SearchError::IndexNotBuilt(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string(), kind: err.kind() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message, "kind": self.kind });
        (self.status, Json(body)).into_response()
    }
}

/// Open the index named by `config` and build the router. Fails fast when
/// the index has not been built.
pub fn build_app(config: SearchConfig) -> Result<Router> {
    let engine = SearchEngine::open(&config)?;
    tracing::info!(
        docs = engine.snapshot().stats.total_docs,
        terms = engine.snapshot().index.num_terms(),
        "index loaded"
    );
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(router(AppState::new(engine, config, admin_token)))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
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
        .route("/query/processed", get(processed_handler))
        .route("/suggest/spelling", get(spelling_handler))
        .route("/suggest/synonyms", get(synonyms_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let engine = state.engine();
    let query = params.q.clone();
    let top_n = params.k.map(|k| k.max(1));
    let results = tokio::task::spawn_blocking(move || engine.search(&query, top_n))
        .await
        .map_err(worker_failed)?
        .map_err(|e| {
            tracing::debug!(query = %params.q, error = %e, "search rejected");
            e
        })?;
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: results.len(), results }))
}

pub async fn processed_handler(
    State(state): State<AppState>,
    Query(params): Query<TextParams>,
) -> Result<Json<ProcessedResponse>, ApiError> {
    let engine = state.engine();
    let query = params.q.clone();
    let processed = tokio::task::spawn_blocking(move || engine.processed_query(&query))
        .await
        .map_err(worker_failed)?;
    Ok(Json(ProcessedResponse { query: params.q, processed }))
}

pub async fn spelling_handler(State(state): State<AppState>, Query(params): Query<TextParams>) -> Json<SuggestResponse> {
    let suggestions = state.engine().suggest_spelling(params.q.trim());
    Json(SuggestResponse { word: params.q, suggestions })
}

pub async fn synonyms_handler(State(state): State<AppState>, Query(params): Query<TextParams>) -> Json<SuggestResponse> {
    let suggestions = state.engine().suggest_synonyms(params.q.trim());
    Json(SuggestResponse { word: params.q, suggestions })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<DocResponse>, ApiError> {
    let engine = state.engine();
    let doc = engine.document(doc_id).ok_or_else(|| ApiError::not_found(format!("no document {doc_id}")))?;
    Ok(Json(DocResponse {
        doc_id,
        title: doc.title.clone(),
        url: doc.url.clone(),
        content: doc.content.clone(),
        language: doc.language,
        length: doc.length,
    }))
}

/// Re-read the index artifacts and swap in a fresh engine. On failure the
/// current engine keeps serving.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let config = state.config.clone();
    let engine = tokio::task::spawn_blocking(move || SearchEngine::open(&config))
        .await
        .map_err(worker_failed)??;
    let total_docs = engine.snapshot().stats.total_docs;
    state.swap(engine);
    tracing::info!(total_docs, "index reloaded");
    Ok(Json(serde_json::json!({ "reloaded": true, "total_docs": total_docs })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError::unauthorized("ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::unauthorized("invalid admin token"))
    }
}

use anyhow::{Context, Result};
use axum::{extract::{Path as UrlPath, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use quill_core::records::read_records;
use quill_core::{Combinator, DocId, IndexConfig, IndexStats, QueryNode, SharedIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub field: String,
    pub q: String,
    #[serde(default)]
    pub mode: Combinator,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: QueryNode,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: Value,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    pub record: Value,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub records: Vec<Value>,
    pub fields: Vec<String>,
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub indexed: usize,
    pub num_docs: usize,
}

type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub index: SharedIndex,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Reads `ADMIN_TOKEN` from the environment.
    pub fn from_env(index: SharedIndex) -> Self {
        AppState { index, admin_token: std::env::var("ADMIN_TOKEN").ok() }
    }
}

/// Builds an index from an analyzer config file, optionally seeded with the
/// records of a JSON or JSONL file.
pub fn load_index(config_path: &str, seed: Option<&str>, fields: &[String]) -> Result<SharedIndex> {
    let file = File::open(config_path).with_context(|| format!("opening config {config_path}"))?;
    let config = IndexConfig::from_reader(BufReader::new(file))?;
    let mut index = config.build()?;
    if let Some(seed) = seed {
        let fields: Vec<String> = if fields.is_empty() {
            config.field_names().map(str::to_string).collect()
        } else {
            fields.to_vec()
        };
        let records = read_records(Path::new(seed)).with_context(|| format!("reading seed {seed}"))?;
        index.index_batch(records, &fields)?;
        tracing::info!(num_docs = index.num_docs(), "seeded index");
    }
    Ok(SharedIndex::new(index))
}

pub fn build_app(state: AppState) -> Router {
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
        .route("/query", post(query_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/index/batch", post(index_batch))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn bad_request(err: quill_core::Error) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn respond(state: &AppState, query: Value, node: Option<QueryNode>, k: usize, start: Instant) -> SearchResponse {
    let k = k.clamp(1, 100);
    let (total_hits, results) = match node {
        Some(node) => {
            let (total, top) = state.index.search(&node, Some(k));
            let results = top
                .into_iter()
                .map(|(hit, record)| SearchHit { doc_id: hit.doc_id, score: hit.score, record })
                .collect();
            (total, results)
        }
        // Edge case: no terms after analysis
        None => (0, Vec::new()),
    };
    SearchResponse { query, took_s: start.elapsed().as_secs_f64(), total_hits, results }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();
    let node = state.index.read().match_query(&params.field, &params.q, params.mode).map_err(bad_request)?;
    Ok(Json(respond(&state, Value::String(params.q), node, params.k, start)))
}

pub async fn query_handler(State(state): State<AppState>, Json(req): Json<QueryRequest>) -> Json<SearchResponse> {
    let start = Instant::now();
    let query = serde_json::to_value(&req.query).unwrap_or(Value::Null);
    Json(respond(&state, query, Some(req.query), req.k, start))
}

pub async fn doc_handler(State(state): State<AppState>, UrlPath(doc_id): UrlPath<DocId>) -> Result<Json<Value>, ApiError> {
    state
        .index
        .doc(doc_id)
        .map(|record| Json(serde_json::json!({ "doc_id": doc_id, "record": record })))
        .ok_or((StatusCode::NOT_FOUND, "not found".into()))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.index.stats())
}

async fn index_batch(State(state): State<AppState>, headers: HeaderMap, Json(batch): Json<BatchRequest>) -> Result<Json<BatchResponse>, ApiError> {
    authorize(&state, &headers)?;
    let indexed = batch.records.len();
    // The write lock blocks readers for the whole batch; keep it off the async workers.
    let index = state.index.clone();
    let num_docs = tokio::task::spawn_blocking(move || index.index_batch(batch.records, &batch.fields))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(bad_request)?;
    tracing::info!(indexed, num_docs, "indexed batch");
    Ok(Json(BatchResponse { indexed, num_docs }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

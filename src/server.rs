//! HTTP server (`dv serve`).
//!
//! Renders the digest page server-side and exposes the same data as JSON.
//! The server keeps no per-user state: every request fetches the manifest
//! and the selected month, builds a fresh [`Viewer`], and replays the
//! filter parameters into it.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | HTML page with month selector, search box, chips and cards |
//! | `GET` | `/api/manifest` | The manifest as JSON |
//! | `GET` | `/api/records` | Filtered records, tag indexes and count |
//! | `GET` | `/health` | Health check (returns version) |
//!
//! # Filter parameters
//!
//! `month`, `q`, repeated `platform` / `topic` (active chips), and for the
//! page form `loaded` (month the selection belongs to), `toggle_platform`,
//! `toggle_topic`, `reset` (`platform` or `topic`). When `loaded` names a
//! different month than `month`, the carried chip selection is dropped,
//! matching what a fresh dataset load does.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "month not found in manifest: 1999-01" } }
//! ```
//!
//! Error codes: `not_found` (404), `upstream` (502).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::session::{fetch_month, open_viewer, FetchedMonth, StateOnly, UnknownMonth, ViewParams};
use crate::source::{open_source, DataSource};
use digest_viewer_core::filter::FilterState;
use digest_viewer_core::models::{Manifest, Record, TagField};
use digest_viewer_core::render::{HtmlRenderer, Renderer};
use digest_viewer_core::viewer::Viewer;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    source: Arc<dyn DataSource>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn DataSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_page))
        .route("/api/manifest", get(handle_manifest))
        .route("/api/records", get(handle_records))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and runs until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let source = open_source(config)?;
    let bind_addr = config.server.bind.clone();
    info!(root = %source.describe(), manifest = %config.data.manifest, "serving digest data");

    let app = build_router(AppState::new(config.clone(), source));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("Digest viewer listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_view<R: Renderer>(renderer: R, fetched: FetchedMonth, params: &ViewParams) -> Result<Viewer<R>, AppError> {
    let mut viewer = open_viewer(renderer, fetched).map_err(classify_error)?;
    params.apply(&mut viewer);
    Ok(viewer)
}

async fn fetch_for(state: &AppState, params: &ViewParams) -> Result<FetchedMonth, AppError> {
    fetch_month(
        state.source.as_ref(),
        &state.config.data.manifest,
        params.month.as_deref(),
    )
    .await
    .map_err(classify_error)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into a JSON HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn upstream_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "upstream".to_string(),
        message: message.into(),
    }
}

/// Unknown months are the client's fault; anything else means the data
/// root could not be read or decoded.
fn classify_error(err: anyhow::Error) -> AppError {
    if let Some(unknown) = err.downcast_ref::<UnknownMonth>() {
        return not_found(unknown.to_string());
    }
    warn!("data load failed: {:#}", err);
    upstream_error(format!("{:#}", err))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/manifest ============

async fn handle_manifest(State(state): State<AppState>) -> Result<Json<Manifest>, AppError> {
    let manifest = state
        .source
        .fetch_manifest(&state.config.data.manifest)
        .await
        .map_err(classify_error)?;
    Ok(Json(manifest))
}

// ============ GET /api/records ============

/// JSON response body for `GET /api/records`.
#[derive(Serialize)]
struct RecordsResponse {
    month: String,
    updated: String,
    count: usize,
    filter: FilterState,
    platforms: Vec<String>,
    topics: Vec<String>,
    records: Vec<Record>,
}

async fn handle_records(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<RecordsResponse>, AppError> {
    let params = ViewParams::from_pairs(pairs);
    let fetched = fetch_for(&state, &params).await?;
    let month = fetched.month.clone();
    let viewer = build_view(StateOnly, fetched, &params)?;

    let records: Vec<Record> = viewer.visible().into_iter().cloned().collect();
    Ok(Json(RecordsResponse {
        month,
        updated: viewer.manifest().updated.clone(),
        count: records.len(),
        filter: viewer.filter().clone(),
        platforms: viewer.tags(TagField::Platform).to_vec(),
        topics: viewer.tags(TagField::Topic).to_vec(),
        records,
    }))
}

// ============ GET / ============

async fn handle_page(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let params = ViewParams::from_pairs(pairs);
    let fetched = fetch_for(&state, &params).await?;
    let viewer = build_view(HtmlRenderer::new(), fetched, &params)?;

    let filter = viewer.filter().clone();
    Ok(Html(viewer.into_renderer().into_page(&filter)))
}

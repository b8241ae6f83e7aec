mod config;
mod metrics;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use extract::{CompletionProvider, Extractor, OllamaClient, Recovery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use metrics::{Metrics, MetricsSnapshot, TimedOperation};

struct AppState<P> {
    extractor: Extractor<P>,
    model: String,
    metrics: Arc<Metrics>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
}

#[derive(Deserialize)]
struct ExtractRequest {
    document: String,
}

#[derive(Deserialize)]
struct RecoverRequest {
    /// Raw model reply to run through the recovery pipeline
    reply: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let state = build_state(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    tracing::info!(
        addr = %config.server.bind_addr,
        model = %config.llm.model,
        "Server listening"
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn build_state(config: &AppConfig) -> Result<Arc<AppState<OllamaClient>>> {
    let client = OllamaClient::new(config.llm.base_url.clone(), config.llm.model.clone())
        .with_json_mode(config.llm.json_mode)
        .with_timeout(config.llm.request_timeout())?;

    Ok(Arc::new(AppState {
        extractor: Extractor::new(client),
        model: config.llm.model.clone(),
        metrics: Metrics::new(),
    }))
}

fn router<P>(state: Arc<AppState<P>>) -> Router
where
    P: CompletionProvider + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check::<P>))
        .route("/extract", post(extract_entities::<P>))
        .route("/recover", post(recover_reply::<P>))
        .route("/stats", get(get_stats::<P>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check<P>(State(state): State<Arc<AppState<P>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.model.clone(),
    })
}

async fn extract_entities<P>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<Recovery>, (StatusCode, Json<ErrorResponse>)>
where
    P: CompletionProvider + Sync,
{
    state.metrics.record_request();
    let timer = TimedOperation::start();

    let recovery = state
        .extractor
        .extract_entities_traced(&req.document)
        .await
        .map_err(|e| {
            state.metrics.record_provider_failure();
            tracing::error!(error = %format!("{:#}", e), "Extraction failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("{:#}", e),
                }),
            )
        })?;

    state.metrics.record_extract(timer.elapsed());
    state.metrics.record_recovery(&recovery);

    Ok(Json(recovery))
}

async fn recover_reply<P>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<RecoverRequest>,
) -> Json<Recovery> {
    state.metrics.record_request();
    let recovery = extract::recover_with_trace(&req.reply);
    state.metrics.record_recovery(&recovery);
    Json(recovery)
}

async fn get_stats<P>(State(state): State<Arc<AppState<P>>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

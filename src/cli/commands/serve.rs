//! HTTP API server.
//!
//! Thin request/response plumbing over the QA engine: two POST endpoints
//! plus a health check, with errors mapped to client vs. server categories.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SvarError;
use crate::qa::QaEngine;
use crate::transcript::{TranscriptSource, YoutubeTranscriptSource};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    engine: QaEngine,
    source: YoutubeTranscriptSource,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        engine: QaEngine::new(&settings)?,
        source: YoutubeTranscriptSource::new(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/load_transcript", post(load_transcript))
        .route("/ask_question", post(ask_question))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Load Transcript", "POST /load_transcript");
    Output::kv("Ask Question", "POST /ask_question");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct LoadTranscriptRequest {
    /// YouTube URL or video ID
    url: String,
}

#[derive(Serialize)]
struct LoadTranscriptResponse {
    message: String,
    transcript: String,
}

#[derive(Deserialize)]
struct AskQuestionRequest {
    question: String,
}

#[derive(Serialize)]
struct AskQuestionResponse {
    answer: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map an error to a caller-visible status.
///
/// Caller mistakes (bad URL, missing captions, empty input, asking before
/// loading) become 4xx; backend and internal failures become 500 with the
/// message only, never internal state.
fn status_for(err: &SvarError) -> StatusCode {
    match err {
        SvarError::InvalidUrl(_) | SvarError::Validation(_) => StatusCode::BAD_REQUEST,
        SvarError::TranscriptUnavailable(_) => StatusCode::NOT_FOUND,
        SvarError::NotReady(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: SvarError) -> axum::response::Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn load_transcript(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoadTranscriptRequest>,
) -> impl IntoResponse {
    let fetched = match state.source.fetch(&req.url).await {
        Ok(fetched) => fetched,
        Err(e) => return error_response(e),
    };

    match state.engine.load(&fetched.text).await {
        Ok(_) => Json(LoadTranscriptResponse {
            message: "Transcript loaded successfully.".to_string(),
            transcript: fetched.text,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskQuestionRequest>,
) -> impl IntoResponse {
    match state.engine.answer(&req.question).await {
        Ok(answer) => Json(AskQuestionResponse { answer }).into_response(),
        Err(e) => error_response(e),
    }
}

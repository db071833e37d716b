//! HTTP decode service
//!
//! `POST /decode` takes a WAV file as the request body and answers with a
//! [`DecodeSummary`]; `GET /health` answers `ok`.

use crate::report::DecodeSummary;
use crate::wav::read_wav;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use magswipe_core::Track2Decoder;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    decoder: Arc<Track2Decoder>,
}

pub fn router(decoder: Track2Decoder) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/decode", post(decode_wav))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            decoder: Arc::new(decoder),
        })
}

async fn health() -> &'static str {
    "ok"
}

async fn decode_wav(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DecodeSummary>, (StatusCode, String)> {
    let capture =
        read_wav(Cursor::new(body)).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    // Decoding is CPU bound; keep it off the async workers
    let decoder = state.decoder.clone();
    let summary = tokio::task::spawn_blocking(move || {
        let swipe = decoder.decode_bidirectional(&capture.samples);
        DecodeSummary::new(&swipe, capture.samples.len())
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    tracing::info!(
        success = summary.success,
        error = summary.error.unwrap_or("none"),
        direction = summary.direction,
        "decoded upload"
    );
    Ok(Json(summary))
}

pub async fn run(addr: SocketAddr, decoder: Track2Decoder) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(decoder)).await
}

//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/` - Health check
//! - `/upload`, `/extract-base64` - Document extraction
//! - `/ask`, `/summary`, `/flashcards`, `/mcqs` - Study tools
//! - `/podcast`, `/podcasts` - Podcast generation and retrieval

pub mod documents;
pub mod health;
pub mod podcast;
pub mod study;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::extraction::DocumentContent;
use crate::middleware::cors_layer;
use crate::models::AppState;
use crate::types::{AppError, AppResult};

/// Largest accepted request body (multipart uploads and base64 payloads).
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(health::router())
        .merge(documents::router(state.clone()))
        .merge(study::router(state.clone()))
        .merge(podcast::router(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Document content for a generation request: the body text when present,
/// otherwise the cached text for `document_id`.
pub(crate) async fn resolve_content(
    state: &AppState,
    document_id: &str,
    body_text: Option<String>,
) -> AppResult<DocumentContent> {
    let text = match body_text.filter(|t| !t.is_empty()) {
        Some(text) => text,
        None => state
            .documents
            .text(document_id)
            .await
            .ok_or(AppError::MissingDocument)?,
    };
    DocumentContent::from_wire(&text)
}

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
    Json, Router,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{error, info, warn};

use super::resolve_content;
use crate::extraction::DocumentContent;
use crate::models::{AppState, PodcastListResponse, PodcastRequest, PodcastResponse};
use crate::types::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/podcast", post(create_podcast))
        .route("/podcasts", get(list_podcasts))
        .route("/podcasts/{filename}", get(get_podcast))
        .with_state(state)
}

async fn create_podcast(
    State(state): State<AppState>,
    Json(request): Json<PodcastRequest>,
) -> ResponseJson<PodcastResponse> {
    info!(document_id = %request.document_id, kind = "podcast", language = %request.language, "Podcast request");

    let result = async move {
        let text = match resolve_content(&state, &request.document_id, request.document_text).await? {
            DocumentContent::Text(text) => text,
            DocumentContent::Image { .. } => {
                return Err(AppError::Synthesis(
                    "Podcasts can only be generated from document text, not images".to_string(),
                ))
            }
        };
        state
            .podcasts
            .synthesize(&text, &request.document_id, &request.language)
            .await
    }
    .await;

    Json(match result {
        Ok(podcast) => PodcastResponse {
            success: true,
            audio_url: Some(format!("/podcasts/{}", podcast.audio_file)),
            filename: Some(podcast.audio_file),
            message: Some(podcast.message),
            error: None,
        },
        Err(e) => {
            error!(kind = "podcast", "{}", e);
            PodcastResponse::failed(e)
        }
    })
}

async fn list_podcasts(State(state): State<AppState>) -> ResponseJson<PodcastListResponse> {
    let podcasts = state.podcasts.list_podcasts().await.unwrap_or_else(|e| {
        error!("Failed to list podcasts: {}", e);
        Vec::new()
    });
    Json(PodcastListResponse {
        success: true,
        podcasts,
    })
}

/// Stored MP3 as an attachment; 404 for unknown or unsafe names.
async fn get_podcast(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    let path = match state.podcasts.locate(&filename).await {
        Ok(path) => path,
        Err(e) => {
            warn!(filename = %filename, "{}", e);
            return not_found();
        }
    };

    let served = ServeFile::new(&path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    if served.status() == StatusCode::NOT_FOUND {
        return not_found();
    }
    let mut response = served.map(Body::new);

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    if let Ok(disposition) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename)) {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    response
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "detail": "Podcast not found" })),
    )
        .into_response()
}

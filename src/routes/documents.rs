use axum::{
    extract::{Multipart, State},
    response::Json as ResponseJson,
    routing::post,
    Json, Router,
};
use tracing::{error, info};

use crate::cache::CachedDocument;
use crate::extraction::{self, decode_base64_file};
use crate::models::{AppState, ExtractBase64Request, ExtractedTextResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload_document))
        .route("/extract-base64", post(extract_from_base64))
        .with_state(state)
}

/// Multipart upload; the file is cached under its own filename.
async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ResponseJson<ExtractedTextResponse> {
    let result = async move {
        let (filename, bytes) = read_file_field(&mut multipart).await?;
        info!(filename = %filename, size = bytes.len(), "Document upload received");
        extract_and_cache(&state, filename.clone(), filename, bytes).await
    }
    .await;

    Json(envelope(result))
}

async fn extract_from_base64(
    State(state): State<AppState>,
    Json(request): Json<ExtractBase64Request>,
) -> ResponseJson<ExtractedTextResponse> {
    info!(document_id = %request.document_id, filename = %request.filename, "Base64 extraction request");

    let result = async move {
        let bytes = decode_base64_file(&request.base64_data)?;
        extract_and_cache(&state, request.document_id, request.filename, bytes.into()).await
    }
    .await;

    Json(envelope(result))
}

async fn read_file_field(multipart: &mut Multipart) -> AppResult<(String, bytes::Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Extraction(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to read upload: {}", e)))?;
        return Ok((filename, bytes));
    }
    Err(AppError::Extraction("No file uploaded".to_string()))
}

/// Extract on the blocking pool, then remember the wire text under `document_id`.
async fn extract_and_cache(
    state: &AppState,
    document_id: String,
    filename: String,
    bytes: bytes::Bytes,
) -> AppResult<(String, usize)> {
    let name = filename.clone();
    let extracted = tokio::task::spawn_blocking(move || extraction::extract(&bytes, &name))
        .await
        .map_err(|e| AppError::Extraction(format!("Extraction task failed: {}", e)))??;

    let text = extracted.content.to_wire();
    state
        .documents
        .insert(
            document_id.clone(),
            CachedDocument {
                text: text.clone(),
                pages: extracted.units,
                filename,
            },
        )
        .await;
    info!(document_id = %document_id, pages = extracted.units, chars = text.len(), "Document cached");

    Ok((text, extracted.units))
}

fn envelope(result: AppResult<(String, usize)>) -> ExtractedTextResponse {
    match result {
        Ok((text, pages)) => ExtractedTextResponse::ok(text, pages),
        Err(e) => {
            error!("Document extraction failed: {}", e);
            ExtractedTextResponse::failed(e)
        }
    }
}

use axum::{extract::State, response::Json as ResponseJson, routing::post, Json, Router};
use tracing::{error, info};

use super::resolve_content;
use crate::models::{
    AIResponse, AppState, FlashcardRequest, FlashcardsResponse, McqRequest, McqsResponse,
    QuestionRequest, SummaryRequest,
};
use crate::study::SummaryStyle;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/summary", post(summarize))
        .route("/flashcards", post(create_flashcards))
        .route("/mcqs", post(create_mcqs))
        .with_state(state)
}

async fn ask(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> ResponseJson<AIResponse> {
    info!(document_id = %request.document_id, kind = "ask", "Study request");

    let result = async move {
        let content = resolve_content(&state, &request.document_id, request.document_text).await?;
        state
            .assistant
            .ask(&request.question, &content, &request.document_id)
            .await
    }
    .await;

    Json(match result {
        Ok(answer) => AIResponse::ok(answer),
        Err(e) => {
            error!(kind = "ask", "{}", e);
            AIResponse::failed(e)
        }
    })
}

async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> ResponseJson<AIResponse> {
    info!(document_id = %request.document_id, kind = "summary", summary_type = %request.summary_type, "Study request");

    let result = async move {
        let content = resolve_content(&state, &request.document_id, request.document_text).await?;
        let style = SummaryStyle::from_name(&request.summary_type);
        state
            .assistant
            .summarize(&content, &request.document_id, style)
            .await
    }
    .await;

    Json(match result {
        Ok(summary) => AIResponse::ok(summary),
        Err(e) => {
            error!(kind = "summary", "{}", e);
            AIResponse::failed(e)
        }
    })
}

async fn create_flashcards(
    State(state): State<AppState>,
    Json(request): Json<FlashcardRequest>,
) -> ResponseJson<FlashcardsResponse> {
    info!(document_id = %request.document_id, kind = "flashcards", count = request.count, "Study request");

    let result = async move {
        let content = resolve_content(&state, &request.document_id, request.document_text).await?;
        state
            .assistant
            .flashcards(&content, &request.document_id, request.count)
            .await
    }
    .await;

    Json(match result {
        Ok(flashcards) => FlashcardsResponse::ok(flashcards),
        Err(e) => {
            error!(kind = "flashcards", "{}", e);
            FlashcardsResponse::failed(e)
        }
    })
}

async fn create_mcqs(
    State(state): State<AppState>,
    Json(request): Json<McqRequest>,
) -> ResponseJson<McqsResponse> {
    info!(document_id = %request.document_id, kind = "mcqs", count = request.count, "Study request");

    let result = async move {
        let content = resolve_content(&state, &request.document_id, request.document_text).await?;
        state
            .assistant
            .mcqs(&content, &request.document_id, request.count)
            .await
    }
    .await;

    Json(match result {
        Ok(mcqs) => McqsResponse::ok(mcqs),
        Err(e) => {
            error!(kind = "mcqs", "{}", e);
            McqsResponse::failed(e)
        }
    })
}

//! Study Assistant
//!
//! Question answering, summaries, flashcards and multiple-choice quizzes over
//! an extracted document or an uploaded image.

pub mod prompts;

pub use prompts::SummaryStyle;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::extraction::DocumentContent;
use crate::llm::LLM;
use crate::models::{Flashcard, Mcq};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

pub struct StudyAssistant {
    llm: LLM,
}

impl StudyAssistant {
    pub fn new(llm: LLM) -> Self {
        Self { llm }
    }

    /// Send one prompt, attaching the image when the document is one.
    async fn generate(&self, prompt: String, content: &DocumentContent) -> AppResult<String> {
        let message = match content {
            DocumentContent::Text(_) => LLMMessage::user(prompt),
            DocumentContent::Image { mime, bytes } => {
                LLMMessage::user_with_base64_image(prompt, BASE64.encode(bytes), mime.clone())
            }
        };

        let request = LLMRequest {
            model: self.llm.model().to_string(),
            messages: vec![message],
            max_tokens: None,
            temperature: None,
            system_instruction: None,
        };

        let response = self.llm.create_chat_completion(&request).await?;
        info!(
            response_len = response.content.len(),
            total_tokens = response.usage.total_tokens,
            "Model responded"
        );
        Ok(response.content)
    }

    pub async fn ask(
        &self,
        question: &str,
        content: &DocumentContent,
        document_name: &str,
    ) -> AppResult<String> {
        info!(document = %document_name, image = content.is_image(), "Answering question");
        let prompt = prompts::ask(question, document_name, text_of(content));
        let context = if content.is_image() {
            "Gemini Vision API error"
        } else {
            "Gemini API error"
        };
        self.generate(prompt, content).await.map_err(|e| wrap(context, e))
    }

    pub async fn summarize(
        &self,
        content: &DocumentContent,
        document_name: &str,
        style: SummaryStyle,
    ) -> AppResult<String> {
        info!(document = %document_name, style = ?style, "Generating summary");
        let prompt = prompts::summary(style, document_name, text_of(content));
        self.generate(prompt, content)
            .await
            .map_err(|e| wrap("Summary generation error", e))
    }

    pub async fn flashcards(
        &self,
        content: &DocumentContent,
        document_name: &str,
        count: usize,
    ) -> AppResult<Vec<Flashcard>> {
        info!(document = %document_name, count, "Generating flashcards");
        let prompt = prompts::flashcards(count, document_name, text_of(content));
        let response = self
            .generate(prompt, content)
            .await
            .map_err(|e| wrap("Flashcard generation error", e))?;
        parse_json_array(&response).map_err(|e| wrap("Flashcard generation error", e))
    }

    pub async fn mcqs(
        &self,
        content: &DocumentContent,
        document_name: &str,
        count: usize,
    ) -> AppResult<Vec<Mcq>> {
        info!(document = %document_name, count, "Generating MCQs");
        let prompt = prompts::mcqs(count, document_name, text_of(content));
        let response = self
            .generate(prompt, content)
            .await
            .map_err(|e| wrap("MCQ generation error", e))?;
        let parsed: Vec<Mcq> =
            parse_json_array(&response).map_err(|e| wrap("MCQ generation error", e))?;

        let total = parsed.len();
        let mcqs: Vec<Mcq> = parsed.into_iter().filter(Mcq::is_well_formed).collect();
        if mcqs.len() < total {
            warn!(dropped = total - mcqs.len(), "Dropped malformed MCQs");
        }
        Ok(mcqs)
    }
}

fn text_of(content: &DocumentContent) -> Option<&str> {
    match content {
        DocumentContent::Text(text) => Some(text),
        DocumentContent::Image { .. } => None,
    }
}

fn wrap(context: &str, error: AppError) -> AppError {
    AppError::Generation(format!("{}: {}", context, error))
}

/// The span from the first `[` to the last `]` of a model response; models
/// often wrap the array in prose or markdown fences.
pub fn extract_json_array(response: &str) -> Option<&str> {
    let start = response.find('[')?;
    let end = response.rfind(']')?;
    (end > start).then(|| &response[start..=end])
}

/// Parse the bracketed array of a model response. No array at all yields an
/// empty list; an array that fails to parse is an error.
pub fn parse_json_array<T: DeserializeOwned>(response: &str) -> AppResult<Vec<T>> {
    match extract_json_array(response) {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| AppError::Generation(format!("invalid JSON in model response: {}", e))),
        None => {
            warn!("Model response contained no JSON array");
            Ok(Vec::new())
        }
    }
}

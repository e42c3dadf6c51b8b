use std::sync::Arc;

use crate::cache::DocumentCache;
use crate::config::Config;
use crate::llm::LLM;
use crate::podcast::{ElevenLabsPipeline, PodcastSynthesizer};
use crate::study::StudyAssistant;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub documents: DocumentCache,
    pub assistant: Arc<StudyAssistant>,
    pub podcasts: Arc<PodcastSynthesizer>,
}

impl AppState {
    /// Services wired to Gemini and ElevenLabs with an empty document cache.
    pub fn new(config: Config) -> Self {
        let assistant = StudyAssistant::new(LLM::from_config(&config.llm));
        let pipeline = ElevenLabsPipeline::new(LLM::from_config(&config.llm), &config.tts);
        let podcasts =
            PodcastSynthesizer::new(Box::new(pipeline), config.storage.podcast_dir.clone());

        Self {
            config,
            documents: DocumentCache::new(),
            assistant: Arc::new(assistant),
            podcasts: Arc::new(podcasts),
        }
    }
}

// Generated study material

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mcq {
    pub question: String,
    pub options: Vec<String>,
    /// Model output may fall outside `0..=3`; see [`Mcq::is_well_formed`]
    #[serde(rename = "correctIndex")]
    pub correct_index: i64,
}

impl Mcq {
    pub const OPTION_COUNT: usize = 4;

    /// Exactly four options and an answer index in `0..=3`.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == Self::OPTION_COUNT
            && (0..Self::OPTION_COUNT as i64).contains(&self.correct_index)
    }
}

// API Request/Response types

#[derive(Debug, serde::Deserialize)]
pub struct ExtractBase64Request {
    pub document_id: String,
    pub filename: String,
    pub base64_data: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct QuestionRequest {
    pub document_id: String,
    pub question: String,
    #[serde(default)]
    pub document_text: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct SummaryRequest {
    pub document_id: String,
    #[serde(default = "default_summary_type")]
    pub summary_type: String, // "short", "detailed", "bullet"
    #[serde(default)]
    pub document_text: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct FlashcardRequest {
    pub document_id: String,
    #[serde(default = "default_flashcard_count")]
    pub count: usize,
    #[serde(default)]
    pub document_text: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct McqRequest {
    pub document_id: String,
    #[serde(default = "default_mcq_count")]
    pub count: usize,
    #[serde(default)]
    pub document_text: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct PodcastRequest {
    pub document_id: String,
    #[serde(default)]
    pub document_text: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_summary_type() -> String {
    "short".to_string()
}

fn default_flashcard_count() -> usize {
    8
}

fn default_mcq_count() -> usize {
    5
}

pub fn default_language() -> String {
    "Tamil".to_string()
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Result of `/upload` and `/extract-base64`
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ExtractedTextResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractedTextResponse {
    pub fn ok(text: String, pages: usize) -> Self {
        Self {
            success: true,
            text: Some(text),
            pages: Some(pages),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Free-text answers (`/ask`, `/summary`)
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct AIResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AIResponse {
    pub fn ok(data: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct FlashcardsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flashcards: Option<Vec<Flashcard>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FlashcardsResponse {
    pub fn ok(flashcards: Vec<Flashcard>) -> Self {
        Self {
            success: true,
            flashcards: Some(flashcards),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct McqsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcqs: Option<Vec<Mcq>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl McqsResponse {
    pub fn ok(mcqs: Vec<Mcq>) -> Self {
        Self {
            success: true,
            mcqs: Some(mcqs),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct PodcastResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PodcastResponse {
    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct PodcastListResponse {
    pub success: bool,
    pub podcasts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let flashcards: FlashcardRequest =
            serde_json::from_str(r#"{"document_id":"a.pdf","document_text":"text"}"#).unwrap();
        assert_eq!(flashcards.count, 8);

        let mcqs: McqRequest = serde_json::from_str(r#"{"document_id":"a.pdf"}"#).unwrap();
        assert_eq!(mcqs.count, 5);
        assert!(mcqs.document_text.is_none());

        let podcast: PodcastRequest = serde_json::from_str(r#"{"document_id":"a.pdf"}"#).unwrap();
        assert_eq!(podcast.language, "Tamil");
    }

    #[test]
    fn test_mcq_wire_name() {
        let mcq: Mcq = serde_json::from_str(
            r#"{"question":"Q?","options":["a","b","c","d"],"correctIndex":2}"#,
        )
        .unwrap();
        assert_eq!(mcq.correct_index, 2);
        assert!(mcq.is_well_formed());
        assert_eq!(serde_json::to_value(&mcq).unwrap()["correctIndex"], 2);
    }

    #[test]
    fn test_failed_envelope_omits_payload() {
        let json = serde_json::to_value(AIResponse::failed("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }
}

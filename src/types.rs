// Model request/response types and the service error

/// One generation call against a model endpoint.
#[derive(Debug, Clone)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text { text: String },
    /// Base64-encoded image bytes with their MIME type
    ImageBase64 { base64: String, media_type: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Multimodal(Vec<ContentPart>),
}

impl MessageContent {
    /// The prompt text: the whole text message, or the first text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(s) => Some(s),
            MessageContent::Multimodal(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ImageBase64 { .. } => None,
            }),
        }
    }

    pub fn has_images(&self) -> bool {
        matches!(self, MessageContent::Multimodal(parts)
            if parts.iter().any(|p| matches!(p, ContentPart::ImageBase64 { .. })))
    }
}

#[derive(Debug, Clone)]
pub struct LLMMessage {
    /// "user" or "model"
    pub role: String,
    pub content: MessageContent,
}

impl LLMMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    /// Prompt text followed by one inline image.
    pub fn user_with_base64_image(
        text: impl Into<String>,
        base64: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        let parts = vec![
            ContentPart::Text { text: text.into() },
            ContentPart::ImageBase64 {
                base64: base64.into(),
                media_type: media_type.into(),
            },
        ];
        Self {
            role: "user".to_string(),
            content: MessageContent::Multimodal(parts),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("{0}")]
    Extraction(String),

    #[error("Invalid base64 data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("{0}")]
    Generation(String),

    #[error("{0}")]
    Synthesis(String),

    #[error("No document text available. Please upload a document first.")]
    MissingDocument,

    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

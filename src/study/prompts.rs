//! Prompt templates for the study tools.
//!
//! Each builder takes the document name and either the document text or
//! `None` for an attached image.

/// Summary length/format requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    Short,
    Detailed,
    Bullet,
}

impl SummaryStyle {
    /// Unknown names fall back to [`SummaryStyle::Short`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "detailed" => SummaryStyle::Detailed,
            "bullet" => SummaryStyle::Bullet,
            _ => SummaryStyle::Short,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            SummaryStyle::Short => "Provide a brief 2-3 sentence summary.",
            SummaryStyle::Detailed => {
                "Provide a comprehensive detailed summary with key themes, main points, and conclusions."
            }
            SummaryStyle::Bullet => {
                "Provide the summary as concise bullet points covering all key takeaways."
            }
        }
    }
}

pub fn ask(question: &str, document_name: &str, text: Option<&str>) -> String {
    match text {
        Some(content) => format!(
            r#"You are a helpful AI study assistant. You are helping the user study a document called "{name}".
Answer questions based on the document content provided below. Be concise, accurate, and helpful.
If the answer is not in the document, say so politely.

Document Content:
{content}

---
User Question: {question}

Please provide a helpful answer:"#,
            name = document_name,
            content = content,
            question = question,
        ),
        None => format!(
            r#"You are a helpful AI study assistant. You are analyzing an image from a document called "{name}".
Look at this image carefully and answer the following question about it.
Be concise, accurate, and helpful. If the image does not contain the answer, say so politely.

Question: {question}

Please provide a helpful answer based on what you see in the image:"#,
            name = document_name,
            question = question,
        ),
    }
}

pub fn summary(style: SummaryStyle, document_name: &str, text: Option<&str>) -> String {
    match text {
        Some(content) => format!(
            r#"You are a study assistant. Summarize the following document.
{instruction}

Document: "{name}"

Content:
{content}

Provide your summary:"#,
            instruction = style.instruction(),
            name = document_name,
            content = content,
        ),
        None => format!(
            r#"You are a study assistant. Analyze this image from "{name}" and summarize what you see.
{instruction}

Provide your summary:"#,
            name = document_name,
            instruction = style.instruction(),
        ),
    }
}

const FLASHCARD_FORMAT: &str = r#"Return the flashcards in this exact JSON format (no markdown, just raw JSON):
[
  {"question": "Question 1?", "answer": "Answer 1"},
  {"question": "Question 2?", "answer": "Answer 2"}
]"#;

pub fn flashcards(count: usize, document_name: &str, text: Option<&str>) -> String {
    match text {
        Some(content) => format!(
            r#"You are a study assistant. Create {count} flashcards from the following document to help with studying.

Each flashcard should have:
- A clear question that tests understanding
- A concise but complete answer

Document: "{name}"

Content:
{content}

{format}

Generate {count} flashcards:"#,
            count = count,
            name = document_name,
            content = content,
            format = FLASHCARD_FORMAT,
        ),
        None => format!(
            r#"You are a study assistant. Look at this image from "{name}" and create {count} flashcards to help with studying.

Each flashcard should have:
- A clear question that tests understanding of what's in the image
- A concise but complete answer

{format}

Generate {count} flashcards:"#,
            name = document_name,
            count = count,
            format = FLASHCARD_FORMAT,
        ),
    }
}

const MCQ_FORMAT: &str = r#"Return the questions in this exact JSON format (no markdown, just raw JSON):
[
  {"question": "Question text?", "options": ["Option A", "Option B", "Option C", "Option D"], "correctIndex": 0}
]

Note: correctIndex is 0-based (0 for A, 1 for B, 2 for C, 3 for D)"#;

pub fn mcqs(count: usize, document_name: &str, text: Option<&str>) -> String {
    match text {
        Some(content) => format!(
            r#"You are a study assistant. Create {count} multiple choice questions from the following document to test understanding.

Each question should have:
- A clear question
- 4 options (A, B, C, D)
- The correct answer marked

Document: "{name}"

Content:
{content}

{format}

Generate {count} MCQ questions:"#,
            count = count,
            name = document_name,
            content = content,
            format = MCQ_FORMAT,
        ),
        None => format!(
            r#"You are a study assistant. Look at this image from "{name}" and create {count} multiple choice questions to test understanding.

Each question should have:
- A clear question about the image content
- 4 options (A, B, C, D)
- The correct answer marked

{format}

Generate {count} MCQ questions:"#,
            name = document_name,
            count = count,
            format = MCQ_FORMAT,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_style_fallback() {
        assert_eq!(SummaryStyle::from_name("detailed"), SummaryStyle::Detailed);
        assert_eq!(SummaryStyle::from_name("bullet"), SummaryStyle::Bullet);
        assert_eq!(SummaryStyle::from_name("short"), SummaryStyle::Short);
        assert_eq!(SummaryStyle::from_name("haiku"), SummaryStyle::Short);
    }

    #[test]
    fn test_text_prompts_embed_document() {
        let prompt = ask("What is osmosis?", "bio.pdf", Some("Osmosis is diffusion of water."));
        assert!(prompt.contains(r#""bio.pdf""#));
        assert!(prompt.contains("Osmosis is diffusion of water."));
        assert!(prompt.contains("User Question: What is osmosis?"));
        assert!(prompt.contains("say so politely"));
    }

    #[test]
    fn test_image_prompts_mention_image() {
        assert!(summary(SummaryStyle::Bullet, "slide.png", None).contains("Analyze this image"));
        assert!(flashcards(3, "slide.png", None).contains("create 3 flashcards"));
        assert!(mcqs(2, "slide.png", None).contains("create 2 multiple choice questions"));
    }

    #[test]
    fn test_json_format_is_literal() {
        let prompt = mcqs(5, "notes.docx", Some("content"));
        assert!(prompt.contains(r#""correctIndex": 0}"#));
        assert!(prompt.contains("Generate 5 MCQ questions:"));
    }
}

//! Text → dialogue → audio pipeline.
//!
//! The generative model writes a two-speaker transcript following the
//! [`ConversationConfig`]; each turn is voiced through ElevenLabs and the MP3
//! segments are concatenated into one file.

use std::path::PathBuf;
use std::sync::LazyLock;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use regex::Regex;
use tracing::info;

use super::elevenlabs::ElevenLabsClient;
use super::ConversationConfig;
use crate::config::TtsConfig;
use crate::llm::LLM;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

/// Turns synthesized at the same time.
const TTS_CONCURRENCY: usize = 2;

static TURN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<Person([12])>([\s\S]*?)</Person[12]>").expect("valid turn pattern")
});

#[async_trait]
pub trait PodcastPipeline: Send + Sync {
    /// Produce an audio file for `text`; `None` when nothing was produced.
    async fn generate(&self, text: &str, config: &ConversationConfig) -> AppResult<Option<PathBuf>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Person1,
    Person2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Parse `<Person1>..</Person1><Person2>..</Person2>` turns, skipping empty ones.
pub fn parse_transcript(transcript: &str) -> Vec<DialogueTurn> {
    TURN_PATTERN
        .captures_iter(transcript)
        .filter_map(|caps| {
            let text = caps[2].trim();
            if text.is_empty() {
                return None;
            }
            let speaker = if &caps[1] == "1" {
                Speaker::Person1
            } else {
                Speaker::Person2
            };
            Some(DialogueTurn {
                speaker,
                text: text.to_string(),
            })
        })
        .collect()
}

pub fn transcript_prompt(text: &str, config: &ConversationConfig) -> String {
    format!(
        r#"You are the writer of "{name}" ({tagline}), an audio podcast.
Turn the source material below into a natural conversation of about {words} words between two speakers:
- Person1 is the {person1}
- Person2 is the {person2}

Conversation style: {style}
Follow this structure: {structure}
Write the entire conversation in {language}.

Format rules:
- Wrap every turn in tags: <Person1>...</Person1> or <Person2>...</Person2>
- Alternate speakers, starting with Person1
- Output only the tagged turns, no stage directions, headings or markdown

Source material:
{text}"#,
        name = config.podcast_name,
        tagline = config.podcast_tagline,
        words = config.word_count,
        person1 = config.roles_person1,
        person2 = config.roles_person2,
        style = config.conversation_style.join(", "),
        structure = config.dialogue_structure.join(" → "),
        language = config.output_language,
        text = text,
    )
}

pub struct ElevenLabsPipeline {
    llm: LLM,
    tts: ElevenLabsClient,
    host_voice: String,
    expert_voice: String,
    scratch_dir: PathBuf,
}

impl ElevenLabsPipeline {
    pub fn new(llm: LLM, config: &TtsConfig) -> Self {
        Self {
            llm,
            tts: ElevenLabsClient::new(config),
            host_voice: config.host_voice.clone(),
            expert_voice: config.expert_voice.clone(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Write intermediate audio somewhere other than the system temp dir
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = dir;
        self
    }

    async fn write_transcript(&self, text: &str, config: &ConversationConfig) -> AppResult<String> {
        let request = LLMRequest {
            model: self.llm.model().to_string(),
            messages: vec![LLMMessage::user(transcript_prompt(text, config))],
            max_tokens: None,
            temperature: Some(config.creativity),
            system_instruction: None,
        };
        let response = self.llm.create_chat_completion(&request).await?;
        Ok(response.content)
    }

    fn voice_for(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Person1 => &self.host_voice,
            Speaker::Person2 => &self.expert_voice,
        }
    }
}

#[async_trait]
impl PodcastPipeline for ElevenLabsPipeline {
    async fn generate(&self, text: &str, config: &ConversationConfig) -> AppResult<Option<PathBuf>> {
        let transcript = self.write_transcript(text, config).await?;
        let turns = parse_transcript(&transcript);
        if turns.is_empty() {
            return Err(AppError::Synthesis(
                "Podcast transcript contained no dialogue turns".to_string(),
            ));
        }
        info!(turns = turns.len(), language = %config.output_language, "Synthesizing podcast audio");

        let requests: Vec<_> = turns
            .iter()
            .map(|turn| self.tts.synthesize(&turn.text, self.voice_for(turn.speaker)))
            .collect();
        let segments: Vec<bytes::Bytes> = futures::stream::iter(requests)
            .buffered(TTS_CONCURRENCY)
            .try_collect()
            .await?;

        // MP3 frames are self-delimiting, so segments can simply be joined
        let audio: Vec<u8> = segments.iter().flat_map(|s| s.iter().copied()).collect();
        if audio.is_empty() {
            return Ok(None);
        }

        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let path = self
            .scratch_dir
            .join(format!("podcast-{}.mp3", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, audio).await?;
        Ok(Some(path))
    }
}

//! Podcast Synthesis
//!
//! Turns document text into a two-speaker audio conversation and stores the
//! resulting MP3 under the configured podcast directory.

pub mod elevenlabs;
pub mod pipeline;

pub use pipeline::{ElevenLabsPipeline, PodcastPipeline};

use std::path::{Component, Path, PathBuf};

use tracing::{error, info, warn};

use crate::types::{AppError, AppResult};

/// Characters of document text handed to the pipeline.
pub const MAX_PODCAST_CHARS: usize = 15_000;

/// Characters kept from the document name (and language) in the filename.
const MAX_NAME_CHARS: usize = 50;

/// Shape of the generated conversation
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ConversationConfig {
    pub output_language: String,
    pub word_count: u32,
    pub conversation_style: Vec<String>,
    pub roles_person1: String,
    pub roles_person2: String,
    pub dialogue_structure: Vec<String>,
    pub podcast_name: String,
    pub podcast_tagline: String,
    pub creativity: f32,
}

impl ConversationConfig {
    pub fn for_language(language: &str) -> Self {
        Self {
            output_language: language.to_string(),
            word_count: 1500,
            conversation_style: vec!["educational".to_string(), "engaging".to_string()],
            roles_person1: "Host".to_string(),
            roles_person2: "Expert".to_string(),
            dialogue_structure: vec![
                "Introduction".to_string(),
                "Main Content Discussion".to_string(),
                "Key Takeaways".to_string(),
                "Conclusion".to_string(),
            ],
            podcast_name: "Study Companion Pro".to_string(),
            podcast_tagline: "Learning made easy through conversation".to_string(),
            creativity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPodcast {
    pub audio_file: String,
    pub audio_path: PathBuf,
    pub message: String,
}

pub struct PodcastSynthesizer {
    pipeline: Box<dyn PodcastPipeline>,
    output_dir: PathBuf,
}

impl PodcastSynthesizer {
    pub fn new(pipeline: Box<dyn PodcastPipeline>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            output_dir: output_dir.into(),
        }
    }

    pub async fn synthesize(
        &self,
        text: &str,
        document_name: &str,
        language: &str,
    ) -> AppResult<GeneratedPodcast> {
        let prepared = prepare_text(text, document_name);
        let config = ConversationConfig::for_language(language);
        let audio_file = podcast_filename(document_name, language);
        info!(document = %document_name, language = %language, file = %audio_file, "Generating podcast");

        let produced = self
            .pipeline
            .generate(&prepared, &config)
            .await
            .map_err(|e| {
                error!("Podcast pipeline failed: {}", e);
                match e {
                    AppError::Synthesis(message) => AppError::Synthesis(message),
                    other => AppError::Synthesis(other.to_string()),
                }
            })?;

        let source = match produced {
            Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => path,
            _ => return Err(AppError::Synthesis("Failed to generate podcast audio".to_string())),
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::Synthesis(format!("Failed to create podcast directory: {}", e)))?;
        let audio_path = self.output_dir.join(&audio_file);
        move_file(&source, &audio_path)
            .await
            .map_err(|e| AppError::Synthesis(format!("Failed to store podcast audio: {}", e)))?;

        info!(path = %audio_path.display(), "Podcast stored");
        Ok(GeneratedPodcast {
            audio_file,
            audio_path,
            message: format!("Podcast generated successfully in {}", language),
        })
    }

    /// Location of a stored podcast; `None` unless `filename` is a single
    /// plain path component (no separators, not `.` or `..`).
    pub fn podcast_path(&self, filename: &str) -> Option<PathBuf> {
        if filename.contains('\\') {
            return None;
        }
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == filename => {
                Some(self.output_dir.join(filename))
            }
            _ => None,
        }
    }

    /// Path of an existing podcast file, or `NotFound`.
    pub async fn locate(&self, filename: &str) -> AppResult<PathBuf> {
        let not_found = || AppError::NotFound("Podcast not found".to_string());
        let path = self.podcast_path(filename).ok_or_else(not_found)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(not_found()),
        }
    }

    /// Stored podcast filenames, sorted. A missing directory lists as empty.
    pub async fn list_podcasts(&self) -> AppResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".mp3") && entry.file_type().await?.is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

fn prepare_text(text: &str, document_name: &str) -> String {
    let body: String = text.chars().take(MAX_PODCAST_CHARS).collect();
    format!("Document: {}\n\n{}", document_name, body)
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .take(MAX_NAME_CHARS)
        .collect()
}

/// `podcast_<name>_<language>.mp3` with both parts reduced to filename-safe
/// ASCII.
pub fn podcast_filename(document_name: &str, language: &str) -> String {
    format!("podcast_{}_{}.mp3", sanitize(document_name), sanitize(language))
}

/// Rename, falling back to copy + remove across filesystems.
async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    if let Err(e) = tokio::fs::remove_file(from).await {
        warn!(path = %from.display(), "Failed to remove intermediate audio: {}", e);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Writes `audio` into `scratch` (or fails) and records the inputs.
    pub(crate) struct FakePipeline {
        scratch: PathBuf,
        audio: Option<Vec<u8>>,
        fail_with: Option<String>,
        pub(crate) calls: Arc<Mutex<Vec<(String, ConversationConfig)>>>,
    }

    impl FakePipeline {
        pub(crate) fn producing(scratch: &Path, audio: &[u8]) -> Self {
            Self {
                scratch: scratch.to_path_buf(),
                audio: Some(audio.to_vec()),
                fail_with: None,
                calls: Arc::default(),
            }
        }

        pub(crate) fn producing_nothing(scratch: &Path) -> Self {
            Self {
                scratch: scratch.to_path_buf(),
                audio: None,
                fail_with: None,
                calls: Arc::default(),
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                scratch: std::env::temp_dir(),
                audio: None,
                fail_with: Some(message.to_string()),
                calls: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl PodcastPipeline for FakePipeline {
        async fn generate(
            &self,
            text: &str,
            config: &ConversationConfig,
        ) -> AppResult<Option<PathBuf>> {
            self.calls.lock().unwrap().push((text.to_string(), config.clone()));
            if let Some(message) = &self.fail_with {
                return Err(AppError::Generation(message.clone()));
            }
            match &self.audio {
                Some(audio) => {
                    let path = self.scratch.join("raw.mp3");
                    std::fs::write(&path, audio)?;
                    Ok(Some(path))
                }
                None => Ok(None),
            }
        }
    }

    #[test]
    fn test_podcast_filename() {
        assert_eq!(
            podcast_filename("My Report #1.pdf", "Tamil"),
            "podcast_My Report 1.pdf_Tamil.mp3"
        );
        assert_eq!(podcast_filename("../../etc/passwd", "English"), "podcast_....etcpasswd_English.mp3");

        let long = "a".repeat(80);
        assert_eq!(podcast_filename(&long, "Tamil"), format!("podcast_{}_Tamil.mp3", "a".repeat(50)));
    }

    #[test]
    fn test_conversation_defaults() {
        let config = ConversationConfig::for_language("Hindi");
        assert_eq!(config.output_language, "Hindi");
        assert_eq!(config.word_count, 1500);
        assert_eq!(config.roles_person1, "Host");
        assert_eq!(config.roles_person2, "Expert");
        assert_eq!(config.dialogue_structure.len(), 4);
        assert!((config.creativity - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_podcast_path_rejects_traversal() {
        let synthesizer = PodcastSynthesizer::new(Box::new(FakePipeline::failing("unused")), "podcasts");
        assert_eq!(
            synthesizer.podcast_path("podcast_a_Tamil.mp3"),
            Some(PathBuf::from("podcasts/podcast_a_Tamil.mp3"))
        );
        assert_eq!(
            synthesizer.podcast_path("podcast_Notes..v2.pdf_Tamil.mp3"),
            Some(PathBuf::from("podcasts/podcast_Notes..v2.pdf_Tamil.mp3"))
        );
        assert_eq!(synthesizer.podcast_path("../secret.mp3"), None);
        assert_eq!(synthesizer.podcast_path(".."), None);
        assert_eq!(synthesizer.podcast_path("."), None);
        assert_eq!(synthesizer.podcast_path("/etc/passwd"), None);
        assert_eq!(synthesizer.podcast_path("a/b.mp3"), None);
        assert_eq!(synthesizer.podcast_path("a\\b.mp3"), None);
        assert_eq!(synthesizer.podcast_path(""), None);
    }

    #[tokio::test]
    async fn test_synthesize_moves_audio_into_output_dir() {
        let scratch = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let pipeline = FakePipeline::producing(scratch.path(), b"ID3data");
        let calls = pipeline.calls.clone();
        let synthesizer = PodcastSynthesizer::new(Box::new(pipeline), output.path().join("podcasts"));

        let podcast = synthesizer
            .synthesize("Cells divide.", "My Report #1.pdf", "Tamil")
            .await
            .unwrap();

        assert!(podcast.audio_file.ends_with("_Tamil.mp3"));
        assert_eq!(podcast.message, "Podcast generated successfully in Tamil");
        assert_eq!(std::fs::read(&podcast.audio_path).unwrap(), b"ID3data");
        assert!(!scratch.path().join("raw.mp3").exists());

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].0, "Document: My Report #1.pdf\n\nCells divide.");
        assert_eq!(calls[0].1.output_language, "Tamil");
    }

    #[tokio::test]
    async fn test_text_is_capped() {
        let scratch = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let pipeline = FakePipeline::producing(scratch.path(), b"x");
        let calls = pipeline.calls.clone();
        let synthesizer = PodcastSynthesizer::new(Box::new(pipeline), output.path());

        let text = "é".repeat(MAX_PODCAST_CHARS + 500);
        synthesizer.synthesize(&text, "long.pdf", "English").await.unwrap();

        let calls = calls.lock().unwrap();
        let body = calls[0].0.strip_prefix("Document: long.pdf\n\n").unwrap();
        assert_eq!(body.chars().count(), MAX_PODCAST_CHARS);
    }

    #[tokio::test]
    async fn test_missing_audio_is_a_failure() {
        let scratch = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let synthesizer =
            PodcastSynthesizer::new(Box::new(FakePipeline::producing_nothing(scratch.path())), output.path());

        let err = synthesizer.synthesize("text", "doc.pdf", "Tamil").await.unwrap_err();
        assert!(matches!(err, AppError::Synthesis(_)));
        assert_eq!(err.to_string(), "Failed to generate podcast audio");
    }

    #[tokio::test]
    async fn test_pipeline_errors_become_synthesis_errors() {
        let output = tempfile::tempdir().unwrap();
        let synthesizer =
            PodcastSynthesizer::new(Box::new(FakePipeline::failing("model unavailable")), output.path());

        let err = synthesizer.synthesize("text", "doc.pdf", "Tamil").await.unwrap_err();
        assert!(matches!(err, AppError::Synthesis(_)));
        assert!(err.to_string().contains("model unavailable"));
    }

    #[tokio::test]
    async fn test_locate_generated_podcast_with_double_dot_name() {
        let scratch = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let synthesizer = PodcastSynthesizer::new(
            Box::new(FakePipeline::producing(scratch.path(), b"ID3")),
            output.path(),
        );

        let podcast = synthesizer
            .synthesize("text", "Notes..v2.pdf", "Tamil")
            .await
            .unwrap();
        assert_eq!(podcast.audio_file, "podcast_Notes..v2.pdf_Tamil.mp3");
        assert_eq!(synthesizer.locate(&podcast.audio_file).await.unwrap(), podcast.audio_path);

        let err = synthesizer.locate("podcast_missing_Tamil.mp3").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(synthesizer.locate("..").await.is_err());
    }

    #[tokio::test]
    async fn test_list_podcasts() {
        let output = tempfile::tempdir().unwrap();
        let synthesizer = PodcastSynthesizer::new(Box::new(FakePipeline::failing("unused")), output.path());
        assert!(synthesizer.list_podcasts().await.unwrap().is_empty());

        std::fs::write(output.path().join("podcast_b_Tamil.mp3"), b"b").unwrap();
        std::fs::write(output.path().join("podcast_a_Tamil.mp3"), b"a").unwrap();
        std::fs::write(output.path().join("notes.txt"), b"n").unwrap();

        assert_eq!(
            synthesizer.list_podcasts().await.unwrap(),
            vec!["podcast_a_Tamil.mp3", "podcast_b_Tamil.mp3"]
        );

        let missing = PodcastSynthesizer::new(
            Box::new(FakePipeline::failing("unused")),
            output.path().join("nope"),
        );
        assert!(missing.list_podcasts().await.unwrap().is_empty());
    }
}

// ElevenLabs text-to-speech client
// API Reference: https://elevenlabs.io/docs/api-reference/text-to-speech/convert

use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::TtsConfig;
use crate::types::{AppError, AppResult};

pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsClient {
    pub fn new(config: &TtsConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.elevenlabs_api_key.clone(),
            base_url: config.elevenlabs_api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// MP3 audio for `text` spoken by `voice_id`.
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> AppResult<Bytes> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id);
        debug!(voice = %voice_id, chars = text.chars().count(), "Requesting speech");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&SpeechRequest {
                text,
                model_id: &self.model,
            })
            .send()
            .await
            .map_err(|e| AppError::Synthesis(format!("ElevenLabs request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Synthesis(format!(
                "ElevenLabs returned {}: {}",
                status, error_text
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| AppError::Synthesis(format!("Failed to read ElevenLabs audio: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client(base: &str) -> ElevenLabsClient {
        let mut config = Config::local(std::env::temp_dir()).tts;
        config.elevenlabs_api_key = "xi-key".to_string();
        config.elevenlabs_api_base = base.to_string();
        ElevenLabsClient::new(&config)
    }

    #[tokio::test]
    async fn test_returns_audio_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/text-to-speech/voice-1")
            .match_header("xi-api-key", "xi-key")
            .match_body(mockito::Matcher::Regex("eleven_multilingual_v2".to_string()))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(b"ID3audio")
            .create_async()
            .await;

        let audio = client(&server.url()).synthesize("Vanakkam", "voice-1").await.unwrap();
        mock.assert_async().await;
        assert_eq!(&audio[..], b"ID3audio");
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/text-to-speech/voice-1")
            .with_status(401)
            .with_body(r#"{"detail":{"status":"invalid_api_key"}}"#)
            .create_async()
            .await;

        let err = client(&server.url()).synthesize("hi", "voice-1").await.unwrap_err();
        assert!(matches!(err, AppError::Synthesis(_)));
        assert!(err.to_string().contains("invalid_api_key"));
    }
}

use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub tts: TtsConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    pub elevenlabs_api_key: String,
    pub elevenlabs_api_base: String,
    pub model: String,
    pub host_voice: String,
    pub expert_voice: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub podcast_dir: PathBuf,
}

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io";
const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:8080,http://localhost:5173,http://localhost:3000";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            llm: LLMConfig {
                gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                gemini_api_base: env::var("GEMINI_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            },
            tts: TtsConfig {
                elevenlabs_api_key: env::var("ELEVENLABS_API_KEY").unwrap_or_default(),
                elevenlabs_api_base: env::var("ELEVENLABS_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_ELEVENLABS_API_BASE.to_string()),
                model: env::var("ELEVENLABS_MODEL")
                    .unwrap_or_else(|_| "eleven_multilingual_v2".to_string()),
                // "Chris" and "Jessica" from the ElevenLabs premade voice library
                host_voice: env::var("ELEVENLABS_HOST_VOICE")
                    .unwrap_or_else(|_| "iP95p4xoKVk53GoZ742B".to_string()),
                expert_voice: env::var("ELEVENLABS_EXPERT_VOICE")
                    .unwrap_or_else(|_| "cgSgspJ2msm6clMCkdW9".to_string()),
            },
            storage: StorageConfig {
                podcast_dir: env::var("PODCAST_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("podcasts")),
            },
        })
    }

    /// Configuration with defaults and no API keys, for tests and local tooling
    pub fn local(podcast_dir: PathBuf) -> Self {
        Self {
            server: ServerConfig {
                port: 8000,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: DEFAULT_ALLOWED_ORIGINS
                    .split(',')
                    .map(str::to_string)
                    .collect(),
            },
            llm: LLMConfig {
                gemini_api_key: String::new(),
                gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                model: DEFAULT_MODEL.to_string(),
            },
            tts: TtsConfig {
                elevenlabs_api_key: String::new(),
                elevenlabs_api_base: DEFAULT_ELEVENLABS_API_BASE.to_string(),
                model: "eleven_multilingual_v2".to_string(),
                host_voice: "iP95p4xoKVk53GoZ742B".to_string(),
                expert_voice: "cgSgspJ2msm6clMCkdW9".to_string(),
            },
            storage: StorageConfig { podcast_dir },
        }
    }
}

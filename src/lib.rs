// Study Companion - document study tools backed by Gemini and ElevenLabs

pub mod cache;
pub mod config;
pub mod extraction;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod podcast;
pub mod routes;
pub mod study;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}

use tokio::net::TcpListener;
use tracing::{info, warn};

use study_companion::{config::Config, create_router, utils::init_logger, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);
    if config.llm.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; generation requests will fail");
    }
    if config.tts.elevenlabs_api_key.is_empty() {
        warn!("ELEVENLABS_API_KEY is not set; podcast requests will fail");
    }

    tokio::fs::create_dir_all(&config.storage.podcast_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create podcast directory: {}", e))?;
    info!("Podcasts stored in {}", config.storage.podcast_dir.display());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_router(AppState::new(config));

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

//! moodmix-server - Mood Classification Microservice
//!
//! Classifies a mood from an uploaded image or a piece of text (Gemini
//! behind a voting pipeline, heuristics when the model is unavailable) and
//! answers with the matching playlist.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use moodmix_server::config::{self, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "moodmix-server", version, about = "Mood to playlist microservice")]
struct Cli {
    /// Path to the TOML config file (default: MOODMIX_CONFIG, then the
    /// platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen port (default: MOODMIX_PORT, then config file, then 5750)
    #[arg(long)]
    port: Option<u16>,

    /// Gemini API key (default: MOODMIX_API_KEY, then config file)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    info!("Starting moodmix-server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration: CLI -> ENV -> TOML -> defaults
    let config_path = config::resolve_config_path(cli.config);
    let server_config = match &config_path {
        Some(path) => {
            info!("Config file: {}", path.display());
            ServerConfig::load(path)?
        }
        None => ServerConfig::default(),
    };

    let api_key = config::resolve_api_key(cli.api_key, &server_config);
    if api_key.is_none() {
        warn!(
            "No API key configured ({} or config file); \
             classifications will use fallback heuristics only",
            config::API_KEY_ENV
        );
    }
    let port = config::resolve_port(cli.port, &server_config);

    let state = moodmix_server::build_state(&server_config, api_key)?;
    let app = moodmix_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}

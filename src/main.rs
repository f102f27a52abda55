use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use skald::infrastructure::observability::{init_tracing, TracingConfig};
use skald::infrastructure::transcription::GroqWhisperEngine;
use skald::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    init_tracing(TracingConfig::default(), settings.server.port);

    let engine = Arc::new(GroqWhisperEngine::new(
        settings.transcription.api_key.clone(),
        Some(settings.transcription.base_url.clone()),
        Some(settings.transcription.model.clone()),
        Some(settings.transcription.language.clone()),
    ));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;

    let state = AppState { engine, settings };
    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

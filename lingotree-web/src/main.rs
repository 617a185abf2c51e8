use anyhow::Context;
use lingotree_mt::{ConfigStore, FileConfigStore, MockMode, MockTranslator};
use lingotree_web::{AppState, router};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store: Arc<dyn ConfigStore> = match std::env::var("LINGOTREE_CONFIG") {
        Ok(path) => Arc::new(FileConfigStore::new(path)),
        Err(_) => Arc::new(FileConfigStore::default_location()?),
    };
    let mut state = AppState::from_store(store).context("Failed to load translation settings")?;

    // Offline mode for trying the editor without an endpoint
    if std::env::var("LINGOTREE_MOCK").is_ok_and(|value| value == "1") {
        info!("Using the mock translator");
        {
            let mut config = state.config.write().await;
            *config = config.clone().with_mock_placeholders();
        }
        state = state.with_translator(Arc::new(MockTranslator::new(MockMode::Suffix(
            "mt".to_string(),
        ))));
    }

    info!("🌳 Starting lingotree web API");

    let app = router(state);
    let addr = std::env::var("LINGOTREE_WEB_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use homework_search::app::AppState;
use homework_search::config::load_settings;
use homework_search::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting homework-search server...");

    // Load configuration.
    let settings = load_settings()?;
    info!(
        "Configuration loaded: environment={}, host={}, port={}",
        settings.environment, settings.host, settings.port
    );

    // Build application state. Store and index connect on first use.
    let state = Arc::new(AppState::from_settings(settings.clone())?);
    info!(
        "Providers: database={}, vector_store={} ({}), embedding={}, ocr={}, rectify={}, storage={}",
        settings.database_provider,
        settings.vector_store_provider,
        settings.vector_collection,
        settings.embedding_provider,
        state.recognizer.provider_name(),
        state.rectifier.provider_name(),
        state.storage.provider_name(),
    );

    // Build router.
    let app = routes::build_router(state);

    // Start server.
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

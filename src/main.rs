use std::sync::Arc;

use copyfeed::config::Config;
use copyfeed::services::SqliteStore;
use copyfeed::sources::AlphaVantageClient;
use copyfeed::AppState;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "copyfeed=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting copyfeed server on {}:{}", config.host, config.port);

    if config.alpha_vantage_api_key == "demo" {
        warn!("ALPHA_VANTAGE_API_KEY not set, using the rate limited demo key");
    }

    let store = Arc::new(SqliteStore::open(&config.database_path)?);
    info!("Document store opened at {}", config.database_path);

    let source = Arc::new(AlphaVantageClient::new(
        config.alpha_vantage_url.clone(),
        config.alpha_vantage_api_key.clone(),
    ));

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, store, source);

    let seeded = state.traders.initialize_bot_traders()?;
    info!("Bot roster ready ({} newly seeded)", seeded);

    if state.config.feed.enabled {
        let feed = state.feed.clone();
        tokio::spawn(async move {
            feed.start().await;
        });
        info!("Bot trade feed started");
    } else {
        info!("Bot trade feed disabled");
    }

    let feed = state.feed.clone();
    let app = copyfeed::app(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("copyfeed server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
            feed.stop();
        })
        .await?;

    Ok(())
}

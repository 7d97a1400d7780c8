use anyhow::Context;
use flight_search_proxy::{app, AmadeusClient, AppConfig, AppState, SearchService, TokenCache};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flight_search_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    if config.credentials.is_none() {
        tracing::warn!("AMADEUS_CLIENT_ID/AMADEUS_CLIENT_SECRET not set; searches will fail");
    }

    let client = AmadeusClient::new(config.client_config())
        .context("Failed to build supplier HTTP client")?;
    let search = SearchService::new(Arc::new(client), TokenCache::new(config.credentials.clone()));

    let state = AppState {
        search: Arc::new(search),
        environment: config.environment,
    };
    let router = app(state, &config.allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        env = config.environment.as_str(),
        origins = ?config.allowed_origins,
        "Listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

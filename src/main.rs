//! Target Router - traffic routing decision service

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use target_router::{
    api,
    clock::SystemClock,
    config::{AppConfig, StorageBackend},
    repository::{redis::RedisStore, Repository},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("target_router={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Target Router v{}", env!("CARGO_PKG_VERSION"));

    let repository = match config.storage.backend {
        StorageBackend::Redis => {
            let store = RedisStore::connect(&config.redis.url, &config.redis.key_prefix).await?;
            tracing::info!("Connected to Redis");
            Repository::redis(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Repository::in_memory()
        }
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let services = Services::new(repository, Arc::new(SystemClock));
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

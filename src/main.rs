use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wardrobe_api::{
    api::{create_router, AppState},
    config::{Config, StorageBackend},
    db::{
        create_pool, create_redis_client, run_migrations, Cache, CacheWriterHandle, MemoryStore,
        PgStore, ProfileStore, WardrobeStore,
    },
    services::{providers::OpenWeatherProvider, StaticWeatherProvider, WeatherProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wardrobe_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (wardrobe, profile): (Arc<dyn WardrobeStore>, Arc<dyn ProfileStore>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let pool = create_pool(&config.database_url).await?;
                run_migrations(&pool).await?;
                let store = Arc::new(PgStore::new(pool));
                (
                    store.clone() as Arc<dyn WardrobeStore>,
                    store as Arc<dyn ProfileStore>,
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                (
                    store.clone() as Arc<dyn WardrobeStore>,
                    store as Arc<dyn ProfileStore>,
                )
            }
        };

    let (weather, cache_writer) = build_weather_provider(&config)?;

    let state = AppState::new(wardrobe, profile, weather, config.default_city.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

/// Live weather when an API key is configured, the fixed fallback otherwise
fn build_weather_provider(
    config: &Config,
) -> anyhow::Result<(Arc<dyn WeatherProvider>, Option<CacheWriterHandle>)> {
    match &config.weather_api_key {
        Some(api_key) => {
            let redis_client = create_redis_client(&config.redis_url)?;
            let (cache, handle) = Cache::new(redis_client);
            let provider =
                OpenWeatherProvider::new(cache, api_key.clone(), config.weather_api_url.clone());
            tracing::info!(provider = provider.name(), "Weather provider configured");
            let provider: Arc<dyn WeatherProvider> = Arc::new(provider);
            Ok((provider, Some(handle)))
        }
        None => {
            tracing::warn!("WEATHER_API_KEY not set, serving fallback weather");
            let provider: Arc<dyn WeatherProvider> = Arc::new(StaticWeatherProvider::default());
            Ok((provider, None))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

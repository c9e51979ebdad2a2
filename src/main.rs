use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drama_recommender::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache, CacheWriterHandle, Catalog},
    services::{OmdbProvider, PlaceholderProvider, PosterProvider, Recommender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drama_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = Catalog::from_path(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog_path))?;
    let recommender = Recommender::build(catalog).context("Failed to build similarity index")?;

    let (posters, cache_writer) = create_poster_provider(&config).await?;
    let state = AppState::new(recommender, posters, &config);

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// OMDb when an API key is configured (cached when Redis is), placeholder otherwise
async fn create_poster_provider(
    config: &Config,
) -> anyhow::Result<(Arc<dyn PosterProvider>, Option<CacheWriterHandle>)> {
    let Some(api_key) = config.omdb_api_key.clone() else {
        tracing::warn!("OMDB_API_KEY not set, serving placeholder posters");
        return Ok((Arc::new(PlaceholderProvider), None));
    };

    let timeout = Duration::from_secs(config.poster_timeout_secs);
    let provider = OmdbProvider::new(api_key, config.omdb_api_url.clone(), timeout)?;

    let Some(redis_url) = &config.redis_url else {
        return Ok((Arc::new(provider), None));
    };

    let client = create_redis_client(redis_url)?;
    match tokio::time::timeout(timeout, Cache::new(client)).await {
        Ok(Ok((cache, handle))) => {
            tracing::info!("Poster cache enabled");
            let provider = provider.with_cache(cache, config.poster_cache_ttl_secs);
            Ok((Arc::new(provider), Some(handle)))
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Poster cache unavailable, continuing without it");
            Ok((Arc::new(provider), None))
        }
        Err(_) => {
            tracing::warn!("Timed out connecting to poster cache, continuing without it");
            Ok((Arc::new(provider), None))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

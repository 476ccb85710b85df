use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use song_recommendations::{
    config::{Config, Storage},
    db::{self, MemoryRepository, PgRecommendationRepository, RecommendationRepository},
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("song_recommendations=debug,tower_http=debug")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        env = ?config.app_env,
        storage = ?config.storage,
        "Configuration loaded"
    );

    let repository: Arc<dyn RecommendationRepository> = match config.storage {
        Storage::Postgres => {
            let pool =
                db::create_pool(&config.database_url, config.database_max_connections).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgRecommendationRepository::new(pool))
        }
        Storage::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Arc::new(MemoryRepository::new())
        }
    };

    let state = Arc::new(AppState::new(repository, config.reset_route_enabled()));
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

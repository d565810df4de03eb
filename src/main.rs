//! Carnet content store
//!
//! Serves the single-document content API over SQLite so the notebook client
//! has a store to sync against.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carnet::{create_router, db, AppState, Config, StoreRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Carnet content store");
    tracing::info!("Database path: {:?}", config.store_db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if no token is configured
    if config.token.is_none() {
        tracing::warn!("No token configured (CARNET_TOKEN). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.store_db_path).await?;
    let repo = Arc::new(StoreRepository::new(pool));

    // Declare the hosted repository
    let info = repo
        .ensure_repository(&config.owner, &config.repo, &config.branch)
        .await?;
    tracing::info!(
        "Hosting {} (default branch {})",
        info.full_name,
        info.default_branch
    );

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

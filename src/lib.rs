//! Carnet
//!
//! Synchronization core of a restaurant notebook: one JSON document kept in a
//! Git-style content store, cached on the device, edited through a
//! [`SyncCoordinator`]. The crate also bundles a small SQLite-backed content
//! store speaking the same REST contract, served by the `carnet-store` binary.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod geocode;
pub mod local_store;
pub mod models;
pub mod remote;
pub mod sync;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use db::StoreRepository;
pub use errors::{AppError, SyncError};
pub use local_store::LocalStore;
pub use remote::RemoteDocumentClient;
pub use sync::{SyncCoordinator, SyncEvent, SyncOptions, SyncState};

/// Application state shared across all handlers of the content store.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<StoreRepository>,
    pub config: Arc<Config>,
}

/// Create the content store router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the token for the auth layer
    let token = state.config.token.clone();

    // Content API routes
    let api_routes = Router::new()
        .route("/repos/{owner}/{repo}", get(api::get_repository))
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(api::get_contents).put(api::put_contents),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::token_auth_layer(token.clone(), req, next)
        }));

    // Health check and raw reads (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health_check))
        .route("/raw/{owner}/{repo}/{branch}/{*path}", get(api::get_raw));

    Router::new()
        .merge(api_routes)
        .merge(public_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

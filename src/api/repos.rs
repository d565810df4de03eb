//! Repository API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::resolve_repository;
use crate::errors::AppError;
use crate::models::RepositoryInfo;
use crate::AppState;

/// GET /repos/{owner}/{repo} - Repository info, used as a reachability check.
pub async fn get_repository(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<RepositoryInfo>, AppError> {
    resolve_repository(&state, &owner, &repo).await.map(Json)
}

/// GET /health - Liveness check.
pub async fn health_check() -> &'static str {
    "OK"
}

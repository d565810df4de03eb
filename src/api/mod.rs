//! REST API module.
//!
//! A single-document subset of the hosted content API: repository lookup,
//! file read and conditional file write, plus an anonymous raw read path.

mod contents;
mod repos;

pub use contents::*;
pub use repos::*;

use crate::errors::AppError;
use crate::models::RepositoryInfo;
use crate::AppState;

/// Look up a hosted repository or fail with 404.
async fn resolve_repository(
    state: &AppState,
    owner: &str,
    repo: &str,
) -> Result<RepositoryInfo, AppError> {
    state
        .repo
        .get_repository(owner, repo)
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))
}

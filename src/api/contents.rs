//! Content API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::resolve_repository;
use crate::db::{FileRef, FileWrite};
use crate::errors::AppError;
use crate::models::{
    CommitInfo, ContentFile, ContentSummary, PutContentRequest, PutContentResponse,
};
use crate::remote::codec::{decode_base64, encode_wrapped};
use crate::AppState;

/// Query string of `GET .../contents/{path}`.
#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

/// GET /repos/{owner}/{repo}/contents/{*path} - Read a file.
pub async fn get_contents(
    State(state): State<AppState>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<ContentFile>, AppError> {
    let info = resolve_repository(&state, &owner, &repo).await?;
    let branch = query.git_ref.unwrap_or(info.default_branch);

    let file = state
        .repo
        .get_file(FileRef {
            owner: &owner,
            repo: &repo,
            branch: &branch,
            path: &path,
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))?;

    Ok(Json(ContentFile {
        name: file.name().to_string(),
        path: file.path.clone(),
        sha: file.sha.clone(),
        size: file.size as u64,
        encoding: "base64".to_string(),
        content: encode_wrapped(&file.content),
    }))
}

/// PUT /repos/{owner}/{repo}/contents/{*path} - Create or update a file.
pub async fn put_contents(
    State(state): State<AppState>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Json(request): Json<PutContentRequest>,
) -> Result<(StatusCode, Json<PutContentResponse>), AppError> {
    let info = resolve_repository(&state, &owner, &repo).await?;

    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }

    let content = decode_base64(&request.content)?;
    let branch = request.branch.clone().unwrap_or(info.default_branch);
    let file = FileRef {
        owner: &owner,
        repo: &repo,
        branch: &branch,
        path: &path,
    };

    let outcome = state
        .repo
        .put_file(
            file,
            FileWrite {
                content: &content,
                message: &request.message,
                expected_sha: request.sha.as_deref(),
                committer: request.committer.as_ref(),
            },
        )
        .await?;

    tracing::info!(
        "{} {}/{}:{}/{} -> {}",
        if request.sha.is_some() { "Updated" } else { "Created" },
        owner,
        repo,
        branch,
        path,
        outcome.file_sha
    );

    let status = if request.sha.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let name = path.rsplit('/').next().unwrap_or(&path).to_string();

    Ok((
        status,
        Json(PutContentResponse {
            content: ContentSummary {
                name,
                path: path.clone(),
                sha: outcome.file_sha,
                size: outcome.size as u64,
            },
            commit: CommitInfo {
                sha: outcome.commit_sha,
                message: request.message,
                committer: request.committer,
            },
        }),
    ))
}

/// GET /raw/{owner}/{repo}/{branch}/{*path} - Anonymous read of a file body.
pub async fn get_raw(
    State(state): State<AppState>,
    Path((owner, repo, branch, path)): Path<(String, String, String, String)>,
) -> Result<Response, AppError> {
    let file = state
        .repo
        .get_file(FileRef {
            owner: &owner,
            repo: &repo,
            branch: &branch,
            path: &path,
        })
        .await?
        .ok_or_else(|| AppError::NotFound("404: Not Found".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        file.content,
    )
        .into_response())
}

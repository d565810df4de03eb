//! Wire types of the REST content API (`/repos/{owner}/{repo}/contents/{path}`).

use serde::{Deserialize, Serialize};

/// A file as returned by `GET .../contents/{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    pub content: String,
}

fn default_encoding() -> String {
    "base64".to_string()
}

/// Identity recorded on a commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// Body of `PUT .../contents/{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentRequest {
    pub message: String,
    pub content: String,
    /// Revision the write is based on. Absent means "create".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer: Option<Committer>,
}

/// Metadata of the written file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSummary {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
}

/// Commit created by a write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer: Option<Committer>,
}

/// Response of `PUT .../contents/{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentResponse {
    pub content: ContentSummary,
    pub commit: CommitInfo,
}

/// Access rights of the caller on a repository.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Permissions {
    #[serde(default)]
    pub pull: bool,
    #[serde(default)]
    pub push: bool,
}

/// Response of `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
    #[serde(default)]
    pub permissions: Permissions,
}

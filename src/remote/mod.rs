//! Remote Document Client.
//!
//! Reads and writes the single notebook file through the REST content API,
//! tracking the revision token (`sha`) the store hands back.

pub mod codec;

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use tokio::sync::RwLock;

use crate::errors::SyncError;
use crate::models::{ContentFile, Document, PutContentRequest, PutContentResponse, RevisionToken};

/// Media type the content API expects.
const ACCEPT: &str = "application/vnd.github.v3+json";

/// Where the notebook lives and how to reach it.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the content API
    pub api_url: String,
    /// Base URL of the anonymous raw-file host
    pub raw_url: String,
    pub owner: String,
    pub repo: String,
    /// Path of the notebook inside the repository
    pub path: String,
    pub branch: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
            owner: String::new(),
            repo: String::new(),
            path: "restaurants.json".to_string(),
            branch: "main".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl RemoteConfig {
    fn repository_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    fn contents_url(&self) -> String {
        format!("{}/contents/{}", self.repository_url(), self.path)
    }

    fn raw_file_url(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch,
            self.path
        )
    }
}

/// Commit message recorded with every save.
pub fn commit_message() -> String {
    format!(
        "Update restaurants - {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Client for the remote notebook file.
pub struct RemoteDocumentClient {
    http: Client,
    config: RwLock<RemoteConfig>,
    token: RwLock<Option<String>>,
}

impl RemoteDocumentClient {
    pub fn new(config: RemoteConfig) -> Result<Self, SyncError> {
        let http = Client::builder()
            .user_agent(concat!("carnet/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config: RwLock::new(config),
            token: RwLock::new(None),
        })
    }

    // ==================== CREDENTIAL & TARGET ====================

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Point the client at another repository.
    pub async fn retarget(&self, owner: impl Into<String>, repo: impl Into<String>) {
        let mut config = self.config.write().await;
        config.owner = owner.into();
        config.repo = repo.into();
    }

    pub async fn config(&self) -> RemoteConfig {
        self.config.read().await.clone()
    }

    async fn require_token(&self) -> Result<String, SyncError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| SyncError::Auth("No credential configured".to_string()))
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header(header::AUTHORIZATION, format!("token {}", token))
            .header(header::ACCEPT, ACCEPT)
    }

    // ==================== READ ====================

    /// Authenticated read of the document and its revision token.
    pub async fn fetch_document(&self) -> Result<(Document, RevisionToken), SyncError> {
        let file = self.fetch_content_file().await?;
        let document = codec::decode_document(&file.content)?;
        tracing::debug!("Fetched remote document at revision {}", file.sha);
        Ok((document, RevisionToken::new(file.sha)))
    }

    /// Current revision token of the remote document.
    pub async fn fetch_revision(&self) -> Result<RevisionToken, SyncError> {
        let file = self.fetch_content_file().await?;
        Ok(RevisionToken::new(file.sha))
    }

    async fn fetch_content_file(&self) -> Result<ContentFile, SyncError> {
        let token = self.require_token().await?;
        let config = self.config().await;

        let response = self
            .authorized(self.http.get(config.contents_url()), &token)
            .query(&[("ref", config.branch.as_str())])
            .send()
            .await?;

        let response = check_status(response, &config.path).await?;
        Ok(response.json::<ContentFile>().await?)
    }

    /// Anonymous read through the raw-file host. A cache-busting query
    /// parameter keeps intermediaries from serving a stale copy.
    pub async fn fetch_public(&self) -> Result<Document, SyncError> {
        let config = self.config().await;
        let cache_buster = Utc::now().timestamp_millis().to_string();

        let response = self
            .http
            .get(config.raw_file_url())
            .query(&[("t", cache_buster.as_str())])
            .send()
            .await?;

        let response = check_status(response, &config.path).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    // ==================== WRITE ====================

    /// Conditional write. `base` is the revision the document was derived
    /// from; `None` creates the file.
    pub async fn write_document(
        &self,
        document: &Document,
        base: Option<&RevisionToken>,
    ) -> Result<RevisionToken, SyncError> {
        let token = self.require_token().await?;
        let config = self.config().await;

        let request = PutContentRequest {
            message: commit_message(),
            content: codec::encode_document(document)?,
            sha: base.map(|b| b.as_str().to_string()),
            branch: Some(config.branch.clone()),
            committer: None,
        };

        let response = self
            .authorized(self.http.put(config.contents_url()), &token)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, &config.path).await?;
        let body = response.json::<PutContentResponse>().await?;
        tracing::info!(
            "Saved {} ({} entries) at revision {}",
            config.path,
            document.total_entries(),
            body.content.sha
        );
        Ok(RevisionToken::new(body.content.sha))
    }

    // ==================== PROBE ====================

    /// Whether the repository is reachable with the current credential and
    /// the file either exists or can be created. Never fails.
    pub async fn test_reachability(&self) -> bool {
        let Ok(token) = self.require_token().await else {
            return false;
        };
        let config = self.config().await;

        let repo = self
            .authorized(self.http.get(config.repository_url()), &token)
            .send()
            .await;
        match repo {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::info!(
                    "Repository {}/{} not reachable: HTTP {}",
                    config.owner,
                    config.repo,
                    response.status()
                );
                return false;
            }
            Err(e) => {
                tracing::info!("Repository {}/{} not reachable: {}", config.owner, config.repo, e);
                return false;
            }
        }

        let file = self
            .authorized(self.http.get(config.contents_url()), &token)
            .query(&[("ref", config.branch.as_str())])
            .send()
            .await;
        match file {
            Ok(response) if response.status().is_success() => true,
            Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                tracing::info!("{} does not exist yet; it will be created", config.path);
                true
            }
            Ok(response) => {
                tracing::info!("{} not readable: HTTP {}", config.path, response.status());
                false
            }
            Err(e) => {
                tracing::info!("{} not readable: {}", config.path, e);
                false
            }
        }
    }
}

/// Map a non-success status to the error taxonomy.
async fn check_status(response: Response, path: &str) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, path, &body))
}

fn status_error(status: StatusCode, path: &str, body: &str) -> SyncError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Auth(detail),
        StatusCode::NOT_FOUND => SyncError::NotFound(format!("{} not found", path)),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            SyncError::Conflict(format!("{} changed remotely: {}", path, detail))
        }
        _ => SyncError::Transient(format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}

//! Error handling module for Carnet.
//!
//! `SyncError` is the taxonomy seen by code that consumes the sync core.
//! `AppError` (in [`http`]) is what the bundled content store returns over HTTP.

mod http;

pub use http::*;

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const AUTH: &str = "AUTH";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const UNRESOLVED_CONFLICT: &str = "UNRESOLVED_CONFLICT";
    pub const TRANSIENT: &str = "TRANSIENT";
    pub const QUOTA: &str = "QUOTA";
    pub const SYNC_IN_PROGRESS: &str = "SYNC_IN_PROGRESS";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CODEC_ERROR: &str = "CODEC_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const VERSION_MISMATCH: &str = "VERSION_MISMATCH";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// SQLite primary result code for "database or disk is full".
const SQLITE_FULL: &str = "13";

/// Errors surfaced by the local store, the remote document client and the
/// sync coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Missing, invalid or revoked credential, or a write attempted in read-only mode
    Auth(String),
    /// The remote document does not exist yet
    NotFound(String),
    /// The revision token supplied on write is stale
    Conflict(String),
    /// A write still conflicted after one merge-and-retry
    UnresolvedConflict(String),
    /// Network failure or unexpected status from the remote store
    Transient(String),
    /// Local storage is full; the store has degraded to session memory
    Quota(String),
    /// Another read or write to the remote document is already in flight
    SyncInProgress,
    /// A mutation or document failed validation
    Validation(String),
    /// The document could not be encoded or decoded
    Codec(String),
    /// Local storage failed for a reason other than quota
    Storage(String),
}

impl SyncError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Auth(_) => codes::AUTH,
            SyncError::NotFound(_) => codes::NOT_FOUND,
            SyncError::Conflict(_) => codes::CONFLICT,
            SyncError::UnresolvedConflict(_) => codes::UNRESOLVED_CONFLICT,
            SyncError::Transient(_) => codes::TRANSIENT,
            SyncError::Quota(_) => codes::QUOTA,
            SyncError::SyncInProgress => codes::SYNC_IN_PROGRESS,
            SyncError::Validation(_) => codes::VALIDATION_ERROR,
            SyncError::Codec(_) => codes::CODEC_ERROR,
            SyncError::Storage(_) => codes::STORAGE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            SyncError::Auth(msg)
            | SyncError::NotFound(msg)
            | SyncError::Conflict(msg)
            | SyncError::UnresolvedConflict(msg)
            | SyncError::Transient(msg)
            | SyncError::Quota(msg)
            | SyncError::Validation(msg)
            | SyncError::Codec(msg)
            | SyncError::Storage(msg) => msg.clone(),
            SyncError::SyncInProgress => "A sync operation is already in progress".to_string(),
        }
    }

    /// Whether the caller may retry the same operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Transient(_)
                | SyncError::Conflict(_)
                | SyncError::UnresolvedConflict(_)
                | SyncError::SyncInProgress
        )
    }

    /// Whether the user must (re)configure a credential.
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Auth(_))
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for SyncError {}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        if is_storage_full(&err) {
            tracing::warn!("Local storage quota exhausted: {}", err);
            return SyncError::Quota(format!("Local storage is full: {}", err));
        }
        tracing::error!("Local storage error: {:?}", err);
        SyncError::Storage(format!("Local storage error: {}", err))
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Codec(format!("JSON error: {}", err))
    }
}

impl From<base64::DecodeError> for SyncError {
    fn from(err: base64::DecodeError) -> Self {
        SyncError::Codec(format!("Base64 error: {}", err))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return SyncError::Codec(format!("Invalid response body: {}", err));
        }
        SyncError::Transient(format!("Network error: {}", err))
    }
}

fn is_storage_full(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some(SQLITE_FULL) || db.message().contains("is full")
        }
        _ => false,
    }
}

//! On-device key-value cache.
//!
//! Holds the last-known-good document, the pending unsynced edit and the
//! saved credentials in one SQLite table. When the page budget is exhausted
//! the store reports [`SyncError::Quota`] once and keeps working from session
//! memory until it is reopened.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::sync::RwLock;

use crate::errors::SyncError;
use crate::models::Document;

const KEY_DOCUMENT: &str = "document";
const KEY_PENDING: &str = "pending";
const KEY_OWNER: &str = "settings.owner";
const KEY_REPO: &str = "settings.repo";
const KEY_TOKEN: &str = "settings.token";

/// A document version that has not reached the remote store yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingEdit {
    pub document: Document,
    pub recorded_at: String,
}

/// Repository coordinates and credential entered in the configuration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
}

/// Persistent key-value cache backed by SQLite.
pub struct LocalStore {
    pool: SqlitePool,
    degraded: AtomicBool,
    /// Session overlay used once degraded. `None` marks a removed key.
    memory: RwLock<HashMap<String, Option<String>>>,
}

impl LocalStore {
    /// Open (or create) the store at `path`. `max_pages` caps the database
    /// size through SQLite's `max_page_count`.
    pub async fn open(path: &Path, max_pages: Option<u32>) -> Result<Self, SyncError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());
        let mut options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(5));
        if let Some(pages) = max_pages {
            options = options.pragma("max_page_count", pages.to_string());
        }

        Self::connect(options).await
    }

    /// Store that lives only as long as the process.
    pub async fn in_memory() -> Result<Self, SyncError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, SyncError> {
        // One connection: pragmas and in-memory databases are per connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            degraded: AtomicBool::new(false),
            memory: RwLock::new(HashMap::new()),
        })
    }

    /// Whether the store has fallen back to session memory.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    // ==================== DOCUMENT CACHE ====================

    /// Last-known-good document. A corrupt entry reads as absent.
    pub async fn read_cache(&self) -> Option<Document> {
        let raw = self.get_logged(KEY_DOCUMENT).await?;
        match serde_json::from_str(&raw) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!("Ignoring corrupt cached document: {}", e);
                None
            }
        }
    }

    /// Replace the cached document in a single statement.
    pub async fn write_cache(&self, document: &Document) -> Result<(), SyncError> {
        let raw = serde_json::to_string(document)?;
        self.put(KEY_DOCUMENT, raw).await
    }

    // ==================== PENDING EDITS ====================

    /// Record a document version that still has to be written remotely.
    pub async fn mark_pending(&self, document: &Document) -> Result<(), SyncError> {
        let pending = PendingEdit {
            document: document.clone(),
            recorded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let raw = serde_json::to_string(&pending)?;
        self.put(KEY_PENDING, raw).await
    }

    pub async fn read_pending(&self) -> Option<PendingEdit> {
        let raw = self.get_logged(KEY_PENDING).await?;
        match serde_json::from_str(&raw) {
            Ok(pending) => Some(pending),
            Err(e) => {
                tracing::warn!("Ignoring corrupt pending edit: {}", e);
                None
            }
        }
    }

    pub async fn clear_pending(&self) -> Result<(), SyncError> {
        self.remove(KEY_PENDING).await
    }

    // ==================== CREDENTIALS ====================

    pub async fn load_credentials(&self) -> StoredCredentials {
        StoredCredentials {
            owner: self.get_logged(KEY_OWNER).await,
            repo: self.get_logged(KEY_REPO).await,
            token: self.get_logged(KEY_TOKEN).await,
        }
    }

    /// Persist the fields that are set; absent fields keep their stored value.
    pub async fn save_credentials(&self, credentials: &StoredCredentials) -> Result<(), SyncError> {
        for (key, value) in [
            (KEY_OWNER, &credentials.owner),
            (KEY_REPO, &credentials.repo),
            (KEY_TOKEN, &credentials.token),
        ] {
            if let Some(value) = value {
                self.put(key, value.clone()).await?;
            }
        }
        Ok(())
    }

    pub async fn clear_token(&self) -> Result<(), SyncError> {
        self.remove(KEY_TOKEN).await
    }

    // ==================== RAW ACCESS ====================

    async fn get_logged(&self, key: &str) -> Option<String> {
        match self.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read '{}' from local store: {}", key, e);
                None
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SyncError> {
        if self.is_degraded() {
            if let Some(value) = self.memory.read().await.get(key) {
                return Ok(value.clone());
            }
        }

        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("value")))
    }

    async fn put(&self, key: &str, value: String) -> Result<(), SyncError> {
        if self.is_degraded() {
            self.memory.write().await.insert(key.to_string(), Some(value));
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&value)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match SyncError::from(e) {
                SyncError::Quota(message) => {
                    self.degrade().await;
                    self.memory.write().await.insert(key.to_string(), Some(value));
                    Err(SyncError::Quota(message))
                }
                other => Err(other),
            },
        }
    }

    async fn remove(&self, key: &str) -> Result<(), SyncError> {
        if self.is_degraded() {
            self.memory.write().await.insert(key.to_string(), None);
            return Ok(());
        }

        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn degrade(&self) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            tracing::warn!("Local store is full; keeping data in memory for this session");
        }
    }
}

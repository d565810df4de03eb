//! Database repository for the content store.
//!
//! Writes are conditional on the caller's `sha` and run in a transaction
//! together with their commit record.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Committer, Permissions, RepositoryInfo};

/// A file as stored, content undecoded.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
    pub content: Vec<u8>,
    pub sha: String,
    pub size: i64,
    pub updated_at: String,
}

impl StoredFile {
    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// One entry of a file's history.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub sha: String,
    pub path: String,
    pub message: String,
    pub file_sha: String,
    pub committer: Option<String>,
    pub created_at: String,
}

/// Identifies a file within a hosted repository.
#[derive(Debug, Clone, Copy)]
pub struct FileRef<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub branch: &'a str,
    pub path: &'a str,
}

/// A write to apply to a file.
#[derive(Debug, Clone)]
pub struct FileWrite<'a> {
    pub content: &'a [u8],
    pub message: &'a str,
    /// `None` creates the file; `Some` updates it only if the current sha matches.
    pub expected_sha: Option<&'a str>,
    pub committer: Option<&'a Committer>,
}

/// Result of a successful write.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub file_sha: String,
    pub commit_sha: String,
    pub size: i64,
}

/// Database repository for all content store operations.
#[derive(Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== REPOSITORY OPERATIONS ====================

    /// Declare a hosted repository. Existing repositories are left untouched.
    pub async fn ensure_repository(
        &self,
        owner: &str,
        name: &str,
        default_branch: &str,
    ) -> Result<RepositoryInfo, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT OR IGNORE INTO repositories (owner, name, default_branch, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(owner)
        .bind(name)
        .bind(default_branch)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_repository(owner, name)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Repository {}/{} vanished", owner, name)))
    }

    /// Get a hosted repository.
    pub async fn get_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<RepositoryInfo>, AppError> {
        let row = sqlx::query(
            "SELECT owner, name, default_branch FROM repositories WHERE owner = ? AND name = ?",
        )
        .bind(owner)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let owner: String = row.get("owner");
            let name: String = row.get("name");
            RepositoryInfo {
                full_name: format!("{}/{}", owner, name),
                name,
                default_branch: row.get("default_branch"),
                permissions: Permissions {
                    pull: true,
                    push: true,
                },
            }
        }))
    }

    // ==================== FILE OPERATIONS ====================

    /// Get the current version of a file.
    pub async fn get_file(&self, file: FileRef<'_>) -> Result<Option<StoredFile>, AppError> {
        let row = sqlx::query(
            r#"SELECT path, content, sha, size, updated_at FROM files
               WHERE owner = ? AND repo = ? AND branch = ? AND path = ?"#,
        )
        .bind(file.owner)
        .bind(file.repo)
        .bind(file.branch)
        .bind(file.path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StoredFile {
            path: row.get("path"),
            content: row.get("content"),
            sha: row.get("sha"),
            size: row.get("size"),
            updated_at: row.get("updated_at"),
        }))
    }

    /// Current sha of a file, if it exists.
    pub async fn current_sha(&self, file: FileRef<'_>) -> Result<Option<String>, AppError> {
        let row = sqlx::query(
            "SELECT sha FROM files WHERE owner = ? AND repo = ? AND branch = ? AND path = ?",
        )
        .bind(file.owner)
        .bind(file.repo)
        .bind(file.branch)
        .bind(file.path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("sha")))
    }

    /// Create or update a file with optimistic concurrency control.
    pub async fn put_file(
        &self,
        file: FileRef<'_>,
        write: FileWrite<'_>,
    ) -> Result<WriteOutcome, AppError> {
        let now = Utc::now().to_rfc3339();
        let file_sha = uuid::Uuid::new_v4().simple().to_string();
        let commit_sha = uuid::Uuid::new_v4().simple().to_string();
        let size = write.content.len() as i64;

        let mut tx = self.pool.begin().await?;

        let result = match write.expected_sha {
            None => {
                sqlx::query(
                    r#"INSERT INTO files (owner, repo, branch, path, content, sha, size, updated_at)
                       VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                       ON CONFLICT (owner, repo, branch, path) DO NOTHING"#,
                )
                .bind(file.owner)
                .bind(file.repo)
                .bind(file.branch)
                .bind(file.path)
                .bind(write.content)
                .bind(&file_sha)
                .bind(size)
                .bind(&now)
                .execute(&mut *tx)
                .await?
            }
            Some(expected) => {
                sqlx::query(
                    r#"UPDATE files SET content = ?, sha = ?, size = ?, updated_at = ?
                       WHERE owner = ? AND repo = ? AND branch = ? AND path = ? AND sha = ?"#,
                )
                .bind(write.content)
                .bind(&file_sha)
                .bind(size)
                .bind(&now)
                .bind(file.owner)
                .bind(file.repo)
                .bind(file.branch)
                .bind(file.path)
                .bind(expected)
                .execute(&mut *tx)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            let current_sha = self.current_sha(file).await?;
            return Err(match (write.expected_sha, current_sha) {
                (None, _) => {
                    AppError::AlreadyExists(format!("{} already exists; \"sha\" wasn't supplied", file.path))
                }
                (Some(expected), current_sha) => AppError::Conflict {
                    message: format!("{} does not match {}", file.path, expected),
                    current_sha,
                },
            });
        }

        let committer = write
            .committer
            .map(|c| format!("{} <{}>", c.name, c.email));

        sqlx::query(
            r#"INSERT INTO commits (sha, owner, repo, branch, path, message, file_sha, committer, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&commit_sha)
        .bind(file.owner)
        .bind(file.repo)
        .bind(file.branch)
        .bind(file.path)
        .bind(write.message)
        .bind(&file_sha)
        .bind(&committer)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            "Wrote {}/{}:{}/{} as {}",
            file.owner,
            file.repo,
            file.branch,
            file.path,
            file_sha
        );

        Ok(WriteOutcome {
            file_sha,
            commit_sha,
            size,
        })
    }

    /// History of a file, newest first.
    pub async fn list_commits(&self, file: FileRef<'_>) -> Result<Vec<CommitRecord>, AppError> {
        let rows = sqlx::query(
            r#"SELECT sha, path, message, file_sha, committer, created_at FROM commits
               WHERE owner = ? AND repo = ? AND branch = ? AND path = ?
               ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(file.owner)
        .bind(file.repo)
        .bind(file.branch)
        .bind(file.path)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CommitRecord {
                sha: row.get("sha"),
                path: row.get("path"),
                message: row.get("message"),
                file_sha: row.get("file_sha"),
                committer: row.get("committer"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    const FILE: FileRef<'static> = FileRef {
        owner: "gianni",
        repo: "carnet",
        branch: "main",
        path: "restaurants.json",
    };

    async fn repository() -> (StoreRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("store.sqlite"))
            .await
            .unwrap();
        let repo = StoreRepository::new(pool);
        repo.ensure_repository("gianni", "carnet", "main")
            .await
            .unwrap();
        (repo, temp_dir)
    }

    fn write<'a>(content: &'a [u8], expected_sha: Option<&'a str>) -> FileWrite<'a> {
        FileWrite {
            content,
            message: "Update restaurants",
            expected_sha,
            committer: None,
        }
    }

    #[tokio::test]
    async fn test_ensure_repository_is_idempotent() {
        let (repo, _dir) = repository().await;
        let info = repo
            .ensure_repository("gianni", "carnet", "develop")
            .await
            .unwrap();
        assert_eq!(info.full_name, "gianni/carnet");
        assert_eq!(info.default_branch, "main");
        assert!(repo.get_repository("gianni", "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_conditional_update() {
        let (repo, _dir) = repository().await;

        let first = repo.put_file(FILE, write(b"{}", None)).await.unwrap();
        let again = repo.put_file(FILE, write(b"{}", None)).await;
        assert!(matches!(again, Err(AppError::AlreadyExists(_))));

        let second = repo
            .put_file(FILE, write(b"{\"a\":1}", Some(&first.file_sha)))
            .await
            .unwrap();
        assert_ne!(first.file_sha, second.file_sha);

        let stale = repo
            .put_file(FILE, write(b"{\"b\":2}", Some(&first.file_sha)))
            .await;
        match stale {
            Err(AppError::Conflict { current_sha, .. }) => {
                assert_eq!(current_sha.as_deref(), Some(second.file_sha.as_str()))
            }
            other => panic!("expected conflict, got {:?}", other),
        }

        let stored = repo.get_file(FILE).await.unwrap().unwrap();
        assert_eq!(stored.content, b"{\"a\":1}");
        assert_eq!(stored.name(), "restaurants.json");
        assert_eq!(repo.list_commits(FILE).await.unwrap().len(), 2);
    }
}

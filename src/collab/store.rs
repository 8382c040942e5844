//! The persistent session store collaborator: an opaque `sqlx::SqlitePool`
//! implementation behind the [`SessionStore`] trait. The resilience core
//! never imports `sqlx` directly — only this module does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session {0} not found")]
    NotFound(String),
}

/// A single compressed/restorable editor session.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Session {
    pub id: String,
    pub project: String,
    pub content: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Opaque persistence collaborator. The admission/resilience core never
/// sees this trait — only the HTTP handlers and the LLM collaborator
/// call site do.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, project: &str, content: &str) -> Result<Session, StoreError>;
    async fn get_session(&self, id: &str) -> Result<Option<Session>, StoreError>;
    async fn update_session(&self, id: &str, content: &str, summary: Option<&str>) -> Result<Session, StoreError>;
    async fn list_sessions(
        &self,
        limit: i64,
        offset: i64,
        project_filter: Option<&str>,
    ) -> Result<Vec<Session>, StoreError>;
    async fn search_sessions(&self, query: &str, limit: i64) -> Result<Vec<Session>, StoreError>;
    async fn track_model_performance(
        &self,
        model: &str,
        processing_time_ms: i64,
        quality: f64,
    ) -> Result<(), StoreError>;
}

/// `sqlx`-backed implementation of [`SessionStore`] over a local SQLite
/// database.
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the `sessions` and `model_performance` tables if they do
    /// not already exist. Called once at startup, matching the
    /// teacher pack's `init_tables` convention.
    pub async fn init_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                project TEXT NOT NULL,
                content TEXT NOT NULL,
                summary TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS model_performance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                model TEXT NOT NULL,
                processing_time_ms INTEGER NOT NULL,
                quality REAL NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create_session(&self, project: &str, content: &str) -> Result<Session, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO sessions (id, project, content, summary, created_at, updated_at)
            VALUES (?1, ?2, ?3, NULL, ?4, ?4)
            "#,
        )
        .bind(&id)
        .bind(project)
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            id,
            project: project.to_string(),
            content: content.to_string(),
            summary: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"SELECT id, project, content, summary, created_at, updated_at FROM sessions WHERE id = ?1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn update_session(&self, id: &str, content: &str, summary: Option<&str>) -> Result<Session, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"UPDATE sessions SET content = ?1, summary = ?2, updated_at = ?3 WHERE id = ?4"#,
        )
        .bind(content)
        .bind(summary)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.get_session(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_sessions(
        &self,
        limit: i64,
        offset: i64,
        project_filter: Option<&str>,
    ) -> Result<Vec<Session>, StoreError> {
        let sessions = match project_filter {
            Some(project) => {
                sqlx::query_as::<_, Session>(
                    r#"
                    SELECT id, project, content, summary, created_at, updated_at
                    FROM sessions
                    WHERE project = ?1
                    ORDER BY updated_at DESC
                    LIMIT ?2 OFFSET ?3
                    "#,
                )
                .bind(project)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Session>(
                    r#"
                    SELECT id, project, content, summary, created_at, updated_at
                    FROM sessions
                    ORDER BY updated_at DESC
                    LIMIT ?1 OFFSET ?2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(sessions)
    }

    async fn search_sessions(&self, query: &str, limit: i64) -> Result<Vec<Session>, StoreError> {
        let pattern = format!("%{query}%");
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, project, content, summary, created_at, updated_at
            FROM sessions
            WHERE content LIKE ?1 OR summary LIKE ?1
            ORDER BY updated_at DESC
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn track_model_performance(
        &self,
        model: &str,
        processing_time_ms: i64,
        quality: f64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO model_performance (model, processing_time_ms, quality, recorded_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(model)
        .bind(processing_time_ms)
        .bind(quality)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

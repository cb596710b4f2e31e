//! Local form drafts
//!
//! Unvalidated form state saved from the console. Drafts stay in a local
//! SQLite file; they never reach the content API and never change an
//! entity's status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::path::Path;
use tracing::info;

use crate::error::{ApiError, ApiResult};

/// One stored draft
#[derive(Debug, Clone, Serialize)]
pub struct Draft {
    pub kind: String,
    pub key: String,
    pub body: Value,
    pub updated_at: DateTime<Utc>,
}

/// Draft listing entry (body omitted)
#[derive(Debug, Clone, Serialize)]
pub struct DraftSummary {
    pub key: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct DraftStore {
    pool: SqlitePool,
}

impl DraftStore {
    /// Open (creating if needed) the drafts database at `path`
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db_url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;
        info!("Opened drafts database: {}", path.display());
        Self::with_pool(pool).await
    }

    /// Private in-memory database (tests, `--drafts-database :memory:`)
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        // every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS drafts (
                kind TEXT NOT NULL,
                draft_key TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL,
                PRIMARY KEY (kind, draft_key)
            )
            "#,
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    pub async fn save(&self, kind: &str, key: &str, body: Value) -> ApiResult<Draft> {
        let updated_at = Utc::now();
        let text = serde_json::to_string(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        sqlx::query(
            "INSERT INTO drafts (kind, draft_key, body, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(kind, draft_key) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
        )
        .bind(kind)
        .bind(key)
        .bind(&text)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Draft {
            kind: kind.to_string(),
            key: key.to_string(),
            body,
            updated_at,
        })
    }

    pub async fn get(&self, kind: &str, key: &str) -> ApiResult<Option<Draft>> {
        let row = sqlx::query("SELECT body, updated_at FROM drafts WHERE kind = ? AND draft_key = ?")
            .bind(kind)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let text: String = row.try_get("body")?;
        let body = serde_json::from_str(&text)
            .map_err(|e| ApiError::Internal(format!("Corrupt draft {}/{}: {}", kind, key, e)))?;
        Ok(Some(Draft {
            kind: kind.to_string(),
            key: key.to_string(),
            body,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    /// Drafts of one kind, most recently saved first
    pub async fn list(&self, kind: &str) -> ApiResult<Vec<DraftSummary>> {
        let rows = sqlx::query(
            "SELECT draft_key, updated_at FROM drafts WHERE kind = ? ORDER BY updated_at DESC",
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(DraftSummary {
                    key: row.try_get("draft_key")?,
                    updated_at: row.try_get("updated_at")?,
                })
            })
            .collect()
    }

    /// Discard a draft; `false` if there was none
    pub async fn delete(&self, kind: &str, key: &str) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM drafts WHERE kind = ? AND draft_key = ?")
            .bind(kind)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_overwrites_and_lists() {
        let store = DraftStore::in_memory().await.unwrap();
        store.save("articles", "new", json!({"title": "A"})).await.unwrap();
        store.save("articles", "new", json!({"title": "B"})).await.unwrap();
        store.save("tips", "3", json!({"title": "T"})).await.unwrap();

        let draft = store.get("articles", "new").await.unwrap().unwrap();
        assert_eq!(draft.body["title"], "B");

        let listed = store.list("articles").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "new");
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = DraftStore::in_memory().await.unwrap();
        store.save("quizzes", "7", json!({})).await.unwrap();
        assert!(store.delete("quizzes", "7").await.unwrap());
        assert!(!store.delete("quizzes", "7").await.unwrap());
        assert!(store.get("quizzes", "7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_connection_never_recycled() {
        let store = DraftStore::in_memory().await.unwrap();
        let options = store.pool.options();
        assert_eq!(options.get_max_connections(), 1);
        assert!(options.get_idle_timeout().is_none());
        assert!(options.get_max_lifetime().is_none());

        store.save("tips", "1", json!({"title": "Kept"})).await.unwrap();
        let saves = (0..8).map(|i| {
            let store = store.clone();
            async move { store.save("tips", &format!("n{}", i), json!({})).await }
        });
        for result in futures::future::join_all(saves).await {
            result.unwrap();
        }
        assert_eq!(store.list("tips").await.unwrap().len(), 9);
        assert_eq!(store.get("tips", "1").await.unwrap().unwrap().body["title"], "Kept");
    }
}

//! SQLite-backed comment store.
//!
//! The moderation transition is a single conditional `UPDATE`, so two
//! concurrent accepts with the correct token resolve to exactly one
//! success at the store layer, with no read-then-write window.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::comment::{Comment, PublicComment};

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    target TEXT NOT NULL,
    author TEXT NOT NULL,
    message TEXT NOT NULL,
    additional TEXT NOT NULL DEFAULT '{}',
    accept_token TEXT NOT NULL UNIQUE,
    is_accepted INTEGER NOT NULL DEFAULT 0,
    added_at TEXT NOT NULL
)";

const TARGET_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_comments_target ON comments (target, is_accepted)";

#[derive(Clone)]
pub struct CommentStore {
    pool: Pool<Sqlite>,
}

impl CommentStore {
    pub async fn connect(url: &str) -> sqlx::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// An in-memory store for tests. Pinned to a single pooled connection
    /// that never expires, since the database lives and dies with it.
    pub async fn in_memory() -> sqlx::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> sqlx::Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        sqlx::query(TARGET_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts a new comment. A colliding id violates the primary key and
    /// surfaces as an error rather than overwriting.
    pub async fn create(&self, comment: &Comment) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, target, author, message, additional, accept_token, is_accepted, added_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&comment.id)
        .bind(&comment.target)
        .bind(&comment.author)
        .bind(&comment.message)
        .bind(&comment.additional)
        .bind(&comment.accept_token)
        .bind(comment.is_accepted)
        .bind(&comment.added_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Atomically flips a comment to accepted, but only if the id exists,
    /// the token matches and the comment is still pending. Returns whether
    /// the transition happened.
    pub async fn accept_if_matches(&self, id: &str, token: &str) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE comments SET is_accepted = 1 \
             WHERE id = ?1 AND accept_token = ?2 AND is_accepted = 0",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Accepted comments for an exact target, public columns only, oldest
    /// first (RFC 3339 strings order chronologically), id as tie-breaker.
    pub async fn list_accepted(&self, target: &str) -> sqlx::Result<Vec<PublicComment>> {
        sqlx::query_as::<_, PublicComment>(
            "SELECT id, author, message, additional, added_at FROM comments \
             WHERE target = ?1 AND is_accepted = 1 ORDER BY added_at, id",
        )
        .bind(target)
        .fetch_all(&self.pool)
        .await
    }

    /// Full record for one comment, used for operator feedback after a
    /// CLI-side accept.
    pub async fn get(&self, id: &str) -> sqlx::Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Total number of stored comments, pending included. Test support:
    /// lets suites assert that rejected submissions wrote nothing.
    pub async fn count(&self) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await
    }
}

use crate::core::moderation::{ModerationError, Warn, WarnStore};
use crate::infra::database::{parse_time, to_text};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteWarnStore {
    pool: Pool<Sqlite>,
}

impl SqliteWarnStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                moderator_id INTEGER NOT NULL,
                reason TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_warns_member ON warns(guild_id, user_id, id DESC)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> ModerationError {
    ModerationError::StorageError(e.to_string())
}

fn row_to_warn(row: &SqliteRow) -> Warn {
    Warn {
        id: row.get("id"),
        guild_id: row.get::<i64, _>("guild_id") as u64,
        user_id: row.get::<i64, _>("user_id") as u64,
        moderator_id: row.get::<i64, _>("moderator_id") as u64,
        reason: row.get("reason"),
        created_at: parse_time(row.get("created_at")).unwrap_or_else(Utc::now),
    }
}

#[async_trait]
impl WarnStore for SqliteWarnStore {
    async fn add_warn(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        reason: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Warn, ModerationError> {
        let row = sqlx::query(
            r#"
            INSERT INTO warns (guild_id, user_id, moderator_id, reason, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(moderator_id as i64)
        .bind(reason)
        .bind(to_text(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row_to_warn(&row))
    }

    async fn list_warns(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<Warn>, ModerationError> {
        let rows = sqlx::query(
            "SELECT * FROM warns WHERE guild_id = ? AND user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows.iter().map(row_to_warn).collect())
    }

    async fn remove_warn(&self, guild_id: u64, warn_id: i64) -> Result<bool, ModerationError> {
        let result = sqlx::query("DELETE FROM warns WHERE guild_id = ? AND id = ?")
            .bind(guild_id as i64)
            .bind(warn_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}

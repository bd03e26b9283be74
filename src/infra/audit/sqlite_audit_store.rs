use crate::core::audit::{AuditError, AuditLogEntry, AuditStore, NewAuditEntry};
use crate::infra::database::{opt_id, parse_time, to_text};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteAuditStore {
    pool: Pool<Sqlite>,
}

impl SqliteAuditStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                actor_id INTEGER,
                target_id INTEGER,
                context TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_audit_guild_time ON audit_logs(guild_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> AuditError {
    AuditError::StorageError(e.to_string())
}

fn row_to_entry(row: &SqliteRow) -> AuditLogEntry {
    AuditLogEntry {
        id: row.get("id"),
        guild_id: row.get::<i64, _>("guild_id") as u64,
        action: row.get("action"),
        actor_id: opt_id(row.get("actor_id")),
        target_id: opt_id(row.get("target_id")),
        context: row.get("context"),
        created_at: parse_time(row.get("created_at")).unwrap_or_else(Utc::now),
    }
}

/// Escape LIKE wildcards so a prefix such as `automod_` matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

// No lower bound compares against the empty string, which sorts first.
fn since_text(since: Option<DateTime<Utc>>) -> String {
    since.map(to_text).unwrap_or_default()
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn insert(
        &self,
        entry: &NewAuditEntry,
        created_at: DateTime<Utc>,
    ) -> Result<AuditLogEntry, AuditError> {
        let row = sqlx::query(
            r#"
            INSERT INTO audit_logs (guild_id, action, actor_id, target_id, context, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(entry.guild_id as i64)
        .bind(&entry.action)
        .bind(entry.actor_id.map(|id| id as i64))
        .bind(entry.target_id.map(|id| id as i64))
        .bind(&entry.context)
        .bind(to_text(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row_to_entry(&row))
    }

    async fn recent(
        &self,
        guild_id: u64,
        limit: usize,
        action_prefix: Option<&str>,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        let rows = match action_prefix {
            Some(prefix) => {
                sqlx::query(
                    r#"
                    SELECT * FROM audit_logs
                    WHERE guild_id = ? AND action LIKE ? ESCAPE '\'
                    ORDER BY created_at DESC, id DESC LIMIT ?
                    "#,
                )
                .bind(guild_id as i64)
                .bind(like_prefix(prefix))
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT * FROM audit_logs WHERE guild_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
                )
                .bind(guild_id as i64)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(storage)?;
        Ok(rows.iter().map(row_to_entry).collect())
    }

    async fn action_summary(
        &self,
        guild_id: u64,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(String, i64)>, AuditError> {
        let rows = sqlx::query(
            r#"
            SELECT action, COUNT(*) AS total FROM audit_logs
            WHERE guild_id = ? AND created_at >= ?
            GROUP BY action
            ORDER BY total DESC, action ASC
            LIMIT ?
            "#,
        )
        .bind(guild_id as i64)
        .bind(since_text(since))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .iter()
            .map(|row| (row.get("action"), row.get("total")))
            .collect())
    }

    async fn actor_summary(
        &self,
        guild_id: u64,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(Option<u64>, i64)>, AuditError> {
        let rows = sqlx::query(
            r#"
            SELECT actor_id, COUNT(*) AS total FROM audit_logs
            WHERE guild_id = ? AND created_at >= ?
            GROUP BY actor_id
            ORDER BY total DESC
            LIMIT ?
            "#,
        )
        .bind(guild_id as i64)
        .bind(since_text(since))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .iter()
            .map(|row| (opt_id(row.get("actor_id")), row.get("total")))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::infra::database::memory_pool;

    async fn seeded() -> SqliteAuditStore {
        let store = SqliteAuditStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        let now = Utc::now();
        let old = now - Duration::days(30);
        store
            .insert(&NewAuditEntry::new(1, "moderation.warn").actor(10).target(20).context("spam"), old)
            .await
            .unwrap();
        store
            .insert(&NewAuditEntry::new(1, "moderation.warn").actor(10), now)
            .await
            .unwrap();
        store
            .insert(&NewAuditEntry::new(1, "automod.violation").target(21), now)
            .await
            .unwrap();
        store
            .insert(&NewAuditEntry::new(1, "moderation_x.other").actor(11), now)
            .await
            .unwrap();
        store
            .insert(&NewAuditEntry::new(2, "moderation.warn").actor(10), now)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_prefix_is_literal() {
        let store = seeded().await;
        let all = store.recent(1, 10, None).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all.last().unwrap().context.as_deref(), Some("spam"));

        let warns = store.recent(1, 10, Some("moderation.")).await.unwrap();
        assert_eq!(warns.len(), 2);
        assert!(warns.iter().all(|e| e.action == "moderation.warn"));

        // "_" must not act as a wildcard.
        let literal = store.recent(1, 10, Some("moderation_")).await.unwrap();
        assert_eq!(literal.len(), 1);
    }

    #[tokio::test]
    async fn summaries_count_and_respect_since() {
        let store = seeded().await;
        let actions = store.action_summary(1, 5, None).await.unwrap();
        assert_eq!(actions[0], ("moderation.warn".to_string(), 2));

        let recent = store
            .action_summary(1, 5, Some(Utc::now() - Duration::days(7)))
            .await
            .unwrap();
        assert!(recent.iter().all(|(_, count)| *count == 1));

        let actors = store.actor_summary(1, 5, None).await.unwrap();
        assert_eq!(actors[0], (Some(10), 2));
        assert!(actors.contains(&(None, 1)));
    }
}

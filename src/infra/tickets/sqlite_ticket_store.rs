use crate::core::tickets::{Ticket, TicketError, TicketStatus, TicketStore};
use crate::infra::database::{parse_time, to_text};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteTicketStore {
    pool: Pool<Sqlite>,
}

impl SqliteTicketStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                channel_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'open',
                created_at TEXT NOT NULL,
                closed_at TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tickets_channel ON tickets(channel_id, status)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> TicketError {
    TicketError::StorageError(e.to_string())
}

fn row_to_ticket(row: &SqliteRow) -> Ticket {
    let status: String = row.get("status");
    Ticket {
        id: row.get("id"),
        guild_id: row.get::<i64, _>("guild_id") as u64,
        user_id: row.get::<i64, _>("user_id") as u64,
        channel_id: row.get::<i64, _>("channel_id") as u64,
        status: TicketStatus::parse(&status),
        created_at: parse_time(row.get("created_at")).unwrap_or_else(Utc::now),
        closed_at: parse_time(row.get("closed_at")),
    }
}

#[async_trait]
impl TicketStore for SqliteTicketStore {
    async fn insert(
        &self,
        guild_id: u64,
        user_id: u64,
        channel_id: u64,
        created_at: DateTime<Utc>,
    ) -> Result<i64, TicketError> {
        let row = sqlx::query(
            r#"
            INSERT INTO tickets (guild_id, user_id, channel_id, status, created_at)
            VALUES (?, ?, ?, 'open', ?)
            RETURNING id
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(channel_id as i64)
        .bind(to_text(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row.get("id"))
    }

    async fn close(&self, ticket_id: i64, closed_at: DateTime<Utc>) -> Result<bool, TicketError> {
        let result = sqlx::query(
            "UPDATE tickets SET status = 'closed', closed_at = ? WHERE id = ? AND status = 'open'",
        )
        .bind(to_text(closed_at))
        .bind(ticket_id)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_open_by_channel(&self, channel_id: u64) -> Result<Option<Ticket>, TicketError> {
        let row = sqlx::query("SELECT * FROM tickets WHERE channel_id = ? AND status = 'open'")
            .bind(channel_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.as_ref().map(row_to_ticket))
    }

    async fn find_open_for_user(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<Ticket>, TicketError> {
        let row = sqlx::query(
            r#"
            SELECT * FROM tickets
            WHERE guild_id = ? AND user_id = ? AND status = 'open'
            ORDER BY id DESC LIMIT 1
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row.as_ref().map(row_to_ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::memory_pool;

    #[tokio::test]
    async fn open_then_close() {
        let store = SqliteTicketStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        let now = Utc::now();

        let id = store.insert(1, 2, 300, now).await.unwrap();
        let open = store.get_open_by_channel(300).await.unwrap().unwrap();
        assert_eq!(open.id, id);
        assert_eq!(open.status, TicketStatus::Open);
        assert_eq!(store.find_open_for_user(1, 2).await.unwrap().unwrap().channel_id, 300);

        assert!(store.close(id, now).await.unwrap());
        assert!(!store.close(id, now).await.unwrap());
        assert!(store.get_open_by_channel(300).await.unwrap().is_none());
        assert!(store.find_open_for_user(1, 2).await.unwrap().is_none());
    }
}

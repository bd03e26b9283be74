use crate::core::reminders::{NewReminder, Reminder, ReminderError, ReminderStore};
use crate::infra::database::{opt_id, parse_time, to_text};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteReminderStore {
    pool: Pool<Sqlite>,
}

impl SqliteReminderStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reminders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                message TEXT NOT NULL,
                remind_at TEXT NOT NULL,
                channel_id INTEGER,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reminders_due ON reminders(remind_at)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> ReminderError {
    ReminderError::StorageError(e.to_string())
}

fn row_to_reminder(row: &SqliteRow) -> Reminder {
    Reminder {
        id: row.get("id"),
        guild_id: row.get::<i64, _>("guild_id") as u64,
        user_id: row.get::<i64, _>("user_id") as u64,
        message: row.get("message"),
        remind_at: parse_time(row.get("remind_at")).unwrap_or_else(Utc::now),
        channel_id: opt_id(row.get("channel_id")),
        created_at: parse_time(row.get("created_at")).unwrap_or_else(Utc::now),
    }
}

#[async_trait]
impl ReminderStore for SqliteReminderStore {
    async fn insert(
        &self,
        reminder: &NewReminder,
        created_at: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError> {
        let row = sqlx::query(
            r#"
            INSERT INTO reminders (guild_id, user_id, message, remind_at, channel_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(reminder.guild_id as i64)
        .bind(reminder.user_id as i64)
        .bind(&reminder.message)
        .bind(to_text(reminder.remind_at))
        .bind(reminder.channel_id.map(|id| id as i64))
        .bind(to_text(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row_to_reminder(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<Reminder>, ReminderError> {
        let row = sqlx::query("SELECT * FROM reminders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.as_ref().map(row_to_reminder))
    }

    async fn due(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, ReminderError> {
        let rows = sqlx::query("SELECT * FROM reminders WHERE remind_at <= ? ORDER BY remind_at, id")
            .bind(to_text(now))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.iter().map(row_to_reminder).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, ReminderError> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, guild_id: u64, user_id: u64, id: i64) -> Result<bool, ReminderError> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ? AND guild_id = ? AND user_id = ?")
            .bind(id)
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, guild_id: u64, user_id: u64) -> Result<Vec<Reminder>, ReminderError> {
        let rows = sqlx::query(
            "SELECT * FROM reminders WHERE guild_id = ? AND user_id = ? ORDER BY remind_at, id",
        )
            .bind(guild_id as i64)
            .bind(user_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.iter().map(row_to_reminder).collect())
    }

    async fn all_pending(&self) -> Result<Vec<Reminder>, ReminderError> {
        let rows = sqlx::query("SELECT * FROM reminders ORDER BY remind_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.iter().map(row_to_reminder).collect())
    }
}

use crate::core::announcements::{
    AnnouncementError, AnnouncementStatus, AnnouncementStore, NewAnnouncement,
    ScheduledAnnouncement,
};
use crate::infra::database::{opt_id, parse_time, to_text};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteAnnouncementStore {
    pool: Pool<Sqlite>,
}

impl SqliteAnnouncementStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scheduled_announcements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                channel_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                content TEXT,
                embed_title TEXT,
                embed_description TEXT,
                mention_role_id INTEGER,
                image_url TEXT,
                scheduled_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_announcements_pending ON scheduled_announcements(status, scheduled_at)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> AnnouncementError {
    AnnouncementError::StorageError(e.to_string())
}

fn row_to_announcement(row: &SqliteRow) -> ScheduledAnnouncement {
    let status: String = row.get("status");
    ScheduledAnnouncement {
        id: row.get("id"),
        guild_id: row.get::<i64, _>("guild_id") as u64,
        channel_id: row.get::<i64, _>("channel_id") as u64,
        author_id: row.get::<i64, _>("author_id") as u64,
        content: row.get("content"),
        embed_title: row.get("embed_title"),
        embed_description: row.get("embed_description"),
        mention_role_id: opt_id(row.get("mention_role_id")),
        image_url: row.get("image_url"),
        scheduled_at: parse_time(row.get("scheduled_at")).unwrap_or_else(Utc::now),
        status: AnnouncementStatus::parse(&status).unwrap_or(AnnouncementStatus::Cancelled),
        created_at: parse_time(row.get("created_at")).unwrap_or_else(Utc::now),
    }
}

#[async_trait]
impl AnnouncementStore for SqliteAnnouncementStore {
    async fn insert(
        &self,
        new: &NewAnnouncement,
        created_at: DateTime<Utc>,
    ) -> Result<ScheduledAnnouncement, AnnouncementError> {
        let row = sqlx::query(
            r#"
            INSERT INTO scheduled_announcements (
                guild_id, channel_id, author_id, content, embed_title, embed_description,
                mention_role_id, image_url, scheduled_at, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            RETURNING *
            "#,
        )
        .bind(new.guild_id as i64)
        .bind(new.channel_id as i64)
        .bind(new.author_id as i64)
        .bind(&new.content)
        .bind(&new.embed_title)
        .bind(&new.embed_description)
        .bind(new.mention_role_id.map(|id| id as i64))
        .bind(&new.image_url)
        .bind(to_text(new.scheduled_at))
        .bind(to_text(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row_to_announcement(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<ScheduledAnnouncement>, AnnouncementError> {
        let row = sqlx::query("SELECT * FROM scheduled_announcements WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.as_ref().map(row_to_announcement))
    }

    async fn list_pending(
        &self,
        guild_id: Option<u64>,
    ) -> Result<Vec<ScheduledAnnouncement>, AnnouncementError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM scheduled_announcements
            WHERE status = 'pending' AND (? IS NULL OR guild_id = ?)
            ORDER BY scheduled_at, id
            "#,
        )
        .bind(guild_id.map(|id| id as i64))
        .bind(guild_id.map(|id| id as i64))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows.iter().map(row_to_announcement).collect())
    }

    async fn finish(&self, id: i64, to: AnnouncementStatus) -> Result<bool, AnnouncementError> {
        let result = sqlx::query(
            "UPDATE scheduled_announcements SET status = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(to.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}

use crate::core::guild_settings::{GuildSettings, GuildSettingsError, GuildSettingsStore};
use crate::infra::database::{opt_id, parse_time, to_text};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteGuildSettingsStore {
    pool: Pool<Sqlite>,
}

impl SqliteGuildSettingsStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS guild_settings (
                guild_id INTEGER PRIMARY KEY,
                welcome_channel_id INTEGER,
                goodbye_channel_id INTEGER,
                log_channel_id INTEGER,
                autorole_id INTEGER,
                timezone TEXT NOT NULL DEFAULT 'Asia/Jakarta',
                ticket_category_id INTEGER,
                activity_log_channel_id INTEGER,
                activity_log_enabled BOOLEAN NOT NULL DEFAULT 0,
                activity_log_disabled_events TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn storage(e: impl ToString) -> GuildSettingsError {
    GuildSettingsError::StorageError(e.to_string())
}

#[async_trait]
impl GuildSettingsStore for SqliteGuildSettingsStore {
    async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, GuildSettingsError> {
        let row = sqlx::query("SELECT * FROM guild_settings WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let events_json: String = row.get("activity_log_disabled_events");
        Ok(Some(GuildSettings {
            guild_id,
            welcome_channel_id: opt_id(row.get("welcome_channel_id")),
            goodbye_channel_id: opt_id(row.get("goodbye_channel_id")),
            log_channel_id: opt_id(row.get("log_channel_id")),
            autorole_id: opt_id(row.get("autorole_id")),
            timezone: row.get("timezone"),
            ticket_category_id: opt_id(row.get("ticket_category_id")),
            activity_log_channel_id: opt_id(row.get("activity_log_channel_id")),
            activity_log_enabled: row.get("activity_log_enabled"),
            activity_log_disabled_events: serde_json::from_str(&events_json).unwrap_or_default(),
            created_at: parse_time(row.get("created_at")).unwrap_or_else(Utc::now),
            updated_at: parse_time(row.get("updated_at")).unwrap_or_else(Utc::now),
        }))
    }

    async fn save(&self, settings: &GuildSettings) -> Result<(), GuildSettingsError> {
        let events_json =
            serde_json::to_string(&settings.activity_log_disabled_events).map_err(storage)?;

        sqlx::query(
            r#"
            INSERT INTO guild_settings (
                guild_id, welcome_channel_id, goodbye_channel_id, log_channel_id,
                autorole_id, timezone, ticket_category_id, activity_log_channel_id,
                activity_log_enabled, activity_log_disabled_events, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                welcome_channel_id = excluded.welcome_channel_id,
                goodbye_channel_id = excluded.goodbye_channel_id,
                log_channel_id = excluded.log_channel_id,
                autorole_id = excluded.autorole_id,
                timezone = excluded.timezone,
                ticket_category_id = excluded.ticket_category_id,
                activity_log_channel_id = excluded.activity_log_channel_id,
                activity_log_enabled = excluded.activity_log_enabled,
                activity_log_disabled_events = excluded.activity_log_disabled_events,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(settings.guild_id as i64)
        .bind(settings.welcome_channel_id.map(|id| id as i64))
        .bind(settings.goodbye_channel_id.map(|id| id as i64))
        .bind(settings.log_channel_id.map(|id| id as i64))
        .bind(settings.autorole_id.map(|id| id as i64))
        .bind(&settings.timezone)
        .bind(settings.ticket_category_id.map(|id| id as i64))
        .bind(settings.activity_log_channel_id.map(|id| id as i64))
        .bind(settings.activity_log_enabled)
        .bind(events_json)
        .bind(to_text(settings.created_at))
        .bind(to_text(settings.updated_at))
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }
}

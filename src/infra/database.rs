// Shared SQLite pool plus the helpers every store uses for ids and timestamps.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Open (creating if needed) the database behind a `sqlite:` url. A single
/// connection keeps SQLite writes serialized.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let path = database_path(database_url);
    if path != ":memory:" {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    tracing::info!("Connected to database at {}", path);
    Ok(pool)
}

/// File path part of a `sqlite://path?query` url.
fn database_path(database_url: &str) -> &str {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    rest.split('?').next().unwrap_or(rest)
}

/// Create every table the bot needs. Safe to run on each start.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    use super::announcements::SqliteAnnouncementStore;
    use super::audit::SqliteAuditStore;
    use super::couples::SqliteCoupleStore;
    use super::economy::{SqliteCoinStore, SqliteShopStore};
    use super::guild_settings::SqliteGuildSettingsStore;
    use super::leveling::SqliteLevelStore;
    use super::moderation::{SqliteAutomodStore, SqliteWarnStore};
    use super::reminders::SqliteReminderStore;
    use super::tickets::SqliteTicketStore;

    SqliteGuildSettingsStore::new(pool.clone()).migrate().await?;
    SqliteLevelStore::new(pool.clone()).migrate().await?;
    SqliteCoinStore::new(pool.clone()).migrate().await?;
    SqliteShopStore::new(pool.clone()).migrate().await?;
    SqliteWarnStore::new(pool.clone()).migrate().await?;
    SqliteAutomodStore::new(pool.clone()).migrate().await?;
    SqliteTicketStore::new(pool.clone()).migrate().await?;
    SqliteReminderStore::new(pool.clone()).migrate().await?;
    SqliteCoupleStore::new(pool.clone()).migrate().await?;
    SqliteAuditStore::new(pool.clone()).migrate().await?;
    SqliteAnnouncementStore::new(pool.clone()).migrate().await?;

    tracing::info!("Database migrations complete");
    Ok(())
}

/// Cheap liveness check for the presence/botstats views.
pub async fn is_connected(pool: &SqlitePool) -> bool {
    !pool.is_closed() && sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

/// Fixed-width UTC text, so string order in SQL matches time order.
pub(crate) fn to_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_time(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

pub(crate) fn opt_id(raw: Option<i64>) -> Option<u64> {
    raw.map(|id| id as u64)
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

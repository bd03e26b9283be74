// Per-guild configuration: welcome/goodbye/log channels, autorole, timezone,
// ticket category and the activity-log switches.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub const DEFAULT_TIMEZONE: &str = "Asia/Jakarta";

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct GuildSettings {
    pub guild_id: u64,
    pub welcome_channel_id: Option<u64>,
    pub goodbye_channel_id: Option<u64>,
    pub log_channel_id: Option<u64>,
    pub autorole_id: Option<u64>,
    pub timezone: String,
    pub ticket_category_id: Option<u64>,
    pub activity_log_channel_id: Option<u64>,
    pub activity_log_enabled: bool,
    /// Category keys switched off for the activity log. Kept sorted and unique.
    pub activity_log_disabled_events: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuildSettings {
    pub fn new(guild_id: u64, now: DateTime<Utc>) -> Self {
        Self {
            guild_id,
            welcome_channel_id: None,
            goodbye_channel_id: None,
            log_channel_id: None,
            autorole_id: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            ticket_category_id: None,
            activity_log_channel_id: None,
            activity_log_enabled: false,
            activity_log_disabled_events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct GuildSettingsPatch {
    pub welcome_channel_id: Option<Option<u64>>,
    pub goodbye_channel_id: Option<Option<u64>>,
    pub log_channel_id: Option<Option<u64>>,
    pub autorole_id: Option<Option<u64>>,
    pub timezone: Option<String>,
    pub ticket_category_id: Option<Option<u64>>,
    pub activity_log_channel_id: Option<Option<u64>>,
    pub activity_log_enabled: Option<bool>,
    pub activity_log_disabled_events: Option<Vec<String>>,
}

impl GuildSettingsPatch {
    pub fn apply(self, settings: &mut GuildSettings) {
        if let Some(v) = self.welcome_channel_id {
            settings.welcome_channel_id = v;
        }
        if let Some(v) = self.goodbye_channel_id {
            settings.goodbye_channel_id = v;
        }
        if let Some(v) = self.log_channel_id {
            settings.log_channel_id = v;
        }
        if let Some(v) = self.autorole_id {
            settings.autorole_id = v;
        }
        if let Some(v) = self.timezone {
            settings.timezone = v;
        }
        if let Some(v) = self.ticket_category_id {
            settings.ticket_category_id = v;
        }
        if let Some(v) = self.activity_log_channel_id {
            settings.activity_log_channel_id = v;
        }
        if let Some(v) = self.activity_log_enabled {
            settings.activity_log_enabled = v;
        }
        if let Some(v) = self.activity_log_disabled_events {
            settings.activity_log_disabled_events = normalize_event_list(v);
        }
    }
}

pub fn normalize_event_list(mut events: Vec<String>) -> Vec<String> {
    for event in events.iter_mut() {
        *event = event.trim().to_lowercase();
    }
    events.retain(|e| !e.is_empty());
    events.sort();
    events.dedup();
    events
}

#[derive(Debug, Error)]
pub enum GuildSettingsError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

#[async_trait]
pub trait GuildSettingsStore: Send + Sync {
    async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, GuildSettingsError>;
    async fn save(&self, settings: &GuildSettings) -> Result<(), GuildSettingsError>;
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct GuildSettingsService<S: GuildSettingsStore> {
    store: S,
}

impl<S: GuildSettingsStore> GuildSettingsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, GuildSettingsError> {
        self.store.get(guild_id).await
    }

    /// Stored settings, or defaults without touching the database.
    pub async fn get_or_default(&self, guild_id: u64) -> Result<GuildSettings, GuildSettingsError> {
        Ok(self
            .store
            .get(guild_id)
            .await?
            .unwrap_or_else(|| GuildSettings::new(guild_id, Utc::now())))
    }

    pub async fn update(
        &self,
        guild_id: u64,
        patch: GuildSettingsPatch,
    ) -> Result<GuildSettings, GuildSettingsError> {
        let now = Utc::now();
        let mut settings = self
            .store
            .get(guild_id)
            .await?
            .unwrap_or_else(|| GuildSettings::new(guild_id, now));
        patch.apply(&mut settings);
        settings.updated_at = now;
        self.store.save(&settings).await?;
        tracing::debug!(guild_id, "Guild settings updated");
        Ok(settings)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dashmap::DashMap;

    #[derive(Default)]
    pub(crate) struct MockSettingsStore {
        rows: DashMap<u64, GuildSettings>,
    }

    #[async_trait]
    impl GuildSettingsStore for MockSettingsStore {
        async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, GuildSettingsError> {
            Ok(self.rows.get(&guild_id).map(|s| s.clone()))
        }

        async fn save(&self, settings: &GuildSettings) -> Result<(), GuildSettingsError> {
            self.rows.insert(settings.guild_id, settings.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn defaults_do_not_persist() {
        let service = GuildSettingsService::new(MockSettingsStore::default());
        let settings = service.get_or_default(7).await.unwrap();
        assert_eq!(settings.timezone, DEFAULT_TIMEZONE);
        assert!(!settings.activity_log_enabled);
        assert!(service.get(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let service = GuildSettingsService::new(MockSettingsStore::default());
        service
            .update(
                1,
                GuildSettingsPatch {
                    welcome_channel_id: Some(Some(10)),
                    log_channel_id: Some(Some(11)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                1,
                GuildSettingsPatch {
                    log_channel_id: Some(None),
                    timezone: Some("Asia/Makassar".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.welcome_channel_id, Some(10));
        assert_eq!(updated.log_channel_id, None);
        assert_eq!(updated.timezone, "Asia/Makassar");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn disabled_events_are_sorted_and_unique() {
        let events = normalize_event_list(vec![
            "voice".into(),
            " Messages ".into(),
            "voice".into(),
            "".into(),
        ]);
        assert_eq!(events, vec!["messages".to_string(), "voice".to_string()]);
    }
}

use super::logging_models::{
    ActivityLogConfig, AttachmentInfo, LogCategory, LogEvent, LoggedUser, TrackedMessage,
};
use crate::core::cache::TtlCache;
use crate::core::guild_settings::{
    GuildSettingsError, GuildSettingsPatch, GuildSettingsService, GuildSettingsStore,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

// Cap how many messages we keep in memory for logging so we don't grow unbounded.
const MAX_TRACKED_MESSAGES: usize = 5_000;
const CONFIG_TTL: Duration = Duration::from_secs(300);

pub const MAX_CONTENT_LENGTH: usize = 1024;
pub const MAX_ATTACHMENT_DISPLAY: usize = 5;

/// Activity log: per-guild switches (stored in guild settings) plus the
/// message snapshots used to report edits and deletions.
pub struct ActivityLogService<S: GuildSettingsStore> {
    settings: Arc<GuildSettingsService<S>>,
    config_cache: TtlCache<u64, ActivityLogConfig>,
    // Message ID -> Snapshot for logging edits/deletes even if Serenity's cache evicts them
    message_cache: DashMap<u64, TrackedMessage>,
}

impl<S: GuildSettingsStore> ActivityLogService<S> {
    pub fn new(settings: Arc<GuildSettingsService<S>>) -> Self {
        Self {
            settings,
            config_cache: TtlCache::new(CONFIG_TTL),
            message_cache: DashMap::new(),
        }
    }

    pub async fn get_config(&self, guild_id: u64) -> Result<ActivityLogConfig, GuildSettingsError> {
        let settings = &self.settings;
        self.config_cache
            .get_or_set(guild_id, || async move {
                let s = settings.get_or_default(guild_id).await?;
                Ok::<_, GuildSettingsError>(ActivityLogConfig {
                    guild_id,
                    enabled: s.activity_log_enabled,
                    channel_id: s.activity_log_channel_id.or(s.log_channel_id),
                    disabled_categories: s.activity_log_disabled_events,
                })
            })
            .await
    }

    /// Channel to post `event` to, if the guild wants it logged.
    pub async fn target_for(
        &self,
        guild_id: u64,
        event: &LogEvent,
    ) -> Result<Option<u64>, GuildSettingsError> {
        Ok(self.get_config(guild_id).await?.target_for(event.category()))
    }

    pub async fn invalidate(&self, guild_id: u64) {
        self.config_cache.invalidate(&guild_id).await;
    }

    async fn update(
        &self,
        guild_id: u64,
        patch: GuildSettingsPatch,
    ) -> Result<ActivityLogConfig, GuildSettingsError> {
        self.settings.update(guild_id, patch).await?;
        self.invalidate(guild_id).await;
        self.get_config(guild_id).await
    }

    /// Set (or clear) the dedicated channel. Setting one also enables logging.
    pub async fn set_channel(
        &self,
        guild_id: u64,
        channel_id: Option<u64>,
    ) -> Result<ActivityLogConfig, GuildSettingsError> {
        self.update(
            guild_id,
            GuildSettingsPatch {
                activity_log_channel_id: Some(channel_id),
                activity_log_enabled: channel_id.map(|_| true),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_enabled(
        &self,
        guild_id: u64,
        enabled: bool,
    ) -> Result<ActivityLogConfig, GuildSettingsError> {
        self.update(
            guild_id,
            GuildSettingsPatch {
                activity_log_enabled: Some(enabled),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_category(
        &self,
        guild_id: u64,
        category: LogCategory,
        enabled: bool,
    ) -> Result<ActivityLogConfig, GuildSettingsError> {
        let mut disabled = self.get_config(guild_id).await?.disabled_categories;
        disabled.retain(|c| c != category.as_str());
        if !enabled {
            disabled.push(category.as_str().to_string());
        }
        self.update(
            guild_id,
            GuildSettingsPatch {
                activity_log_disabled_events: Some(disabled),
                ..Default::default()
            },
        )
        .await
    }

    /// Turn logging off, drop the dedicated channel and re-enable every category.
    pub async fn reset(&self, guild_id: u64) -> Result<ActivityLogConfig, GuildSettingsError> {
        self.update(
            guild_id,
            GuildSettingsPatch {
                activity_log_channel_id: Some(None),
                activity_log_enabled: Some(false),
                activity_log_disabled_events: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
    }

    /// Store a message snapshot so we can later log deletes/edits reliably.
    pub fn remember_message(&self, message: TrackedMessage) {
        self.message_cache.insert(message.message_id, message);

        // Snowflakes grow with time, so the smallest id is the oldest snapshot.
        if self.message_cache.len() > MAX_TRACKED_MESSAGES {
            let oldest = self.message_cache.iter().map(|entry| *entry.key()).min();
            if let Some(key) = oldest {
                self.message_cache.remove(&key);
            }
        }
    }

    /// Get a tracked message without removing it (used for edits).
    pub fn get_tracked_message(&self, message_id: u64) -> Option<TrackedMessage> {
        self.message_cache.get(&message_id).map(|m| m.clone())
    }

    /// Remove a tracked message (used for deletions).
    pub fn take_tracked_message(&self, message_id: u64) -> Option<TrackedMessage> {
        self.message_cache.remove(&message_id).map(|(_, msg)| msg)
    }

    pub fn tracked_count(&self) -> usize {
        self.message_cache.len()
    }
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

/// Trim and cut to `limit` characters, ending with "…" when shortened.
pub fn truncate_content(content: &str, limit: usize) -> String {
    let content = content.trim();
    if content.chars().count() <= limit {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(limit.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

pub fn format_attachments(attachments: &[AttachmentInfo]) -> Option<String> {
    if attachments.is_empty() {
        return None;
    }
    let mut lines: Vec<String> = attachments
        .iter()
        .take(MAX_ATTACHMENT_DISPLAY)
        .map(|a| match &a.url {
            Some(url) => format!("[{}]({})", a.filename, url),
            None => a.filename.clone(),
        })
        .collect();
    if attachments.len() > MAX_ATTACHMENT_DISPLAY {
        lines.push(format!(
            "+{} lampiran lainnya",
            attachments.len() - MAX_ATTACHMENT_DISPLAY
        ));
    }
    Some(lines.join("\n"))
}

pub fn format_user(user: Option<&LoggedUser>, fallback: &str) -> String {
    match user {
        Some(u) => format!("<@{}> (`{}`)", u.id, u.id),
        None => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::guild_settings::tests::MockSettingsStore;

    fn service() -> ActivityLogService<MockSettingsStore> {
        ActivityLogService::new(Arc::new(GuildSettingsService::new(
            MockSettingsStore::default(),
        )))
    }

    fn tracked(id: u64) -> TrackedMessage {
        TrackedMessage {
            message_id: id,
            guild_id: 1,
            channel_id: 2,
            author_id: 3,
            author_name: "budi".into(),
            content: format!("pesan {}", id),
            attachments: Vec::new(),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn disabled_by_default() {
        let service = service();
        let config = service.get_config(1).await.unwrap();
        assert!(!config.enabled);
        assert!(!config.allows(LogCategory::Messages));
    }

    #[tokio::test]
    async fn channel_and_category_switches() {
        let service = service();
        let config = service.set_channel(1, Some(55)).await.unwrap();
        assert!(config.enabled);
        assert_eq!(config.target_for(LogCategory::Voice), Some(55));

        let config = service
            .set_category(1, LogCategory::Voice, false)
            .await
            .unwrap();
        assert_eq!(config.disabled_categories, vec!["voice".to_string()]);
        assert_eq!(config.target_for(LogCategory::Voice), None);
        assert_eq!(config.target_for(LogCategory::Members), Some(55));

        // Disabling twice keeps a single entry; enabling removes it.
        service
            .set_category(1, LogCategory::Voice, false)
            .await
            .unwrap();
        let config = service
            .set_category(1, LogCategory::Voice, true)
            .await
            .unwrap();
        assert!(config.disabled_categories.is_empty());

        let config = service.set_enabled(1, false).await.unwrap();
        assert_eq!(config.target_for(LogCategory::Members), None);

        let config = service.reset(1).await.unwrap();
        assert_eq!(config.channel_id, None);
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn falls_back_to_moderation_log_channel() {
        let service = service();
        service
            .settings
            .update(
                1,
                GuildSettingsPatch {
                    log_channel_id: Some(Some(9)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        service.invalidate(1).await;
        let config = service.set_enabled(1, true).await.unwrap();
        assert_eq!(config.channel_id, Some(9));
    }

    #[tokio::test]
    async fn config_is_cached_until_invalidated() {
        let service = service();
        assert!(!service.get_config(1).await.unwrap().enabled);

        // A write that bypasses the service is not seen until invalidation.
        service
            .settings
            .update(
                1,
                GuildSettingsPatch {
                    activity_log_enabled: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!service.get_config(1).await.unwrap().enabled);
        service.invalidate(1).await;
        assert!(service.get_config(1).await.unwrap().enabled);
    }

    #[test]
    fn snapshot_cache_is_bounded_and_evicts_oldest() {
        let service = service();
        for id in 1..=(MAX_TRACKED_MESSAGES as u64 + 10) {
            service.remember_message(tracked(id));
        }
        assert_eq!(service.tracked_count(), MAX_TRACKED_MESSAGES);
        assert!(service.get_tracked_message(1).is_none());
        assert!(service.get_tracked_message(MAX_TRACKED_MESSAGES as u64 + 10).is_some());

        let taken = service.take_tracked_message(20).unwrap();
        assert_eq!(taken.content, "pesan 20");
        assert!(service.get_tracked_message(20).is_none());
    }

    #[test]
    fn truncation_and_attachments() {
        assert_eq!(truncate_content("  halo  ", 10), "halo");
        let cut = truncate_content(&"x".repeat(2000), MAX_CONTENT_LENGTH);
        assert_eq!(cut.chars().count(), MAX_CONTENT_LENGTH);
        assert!(cut.ends_with('…'));

        assert_eq!(format_attachments(&[]), None);
        let files: Vec<AttachmentInfo> = (0..7)
            .map(|i| AttachmentInfo {
                filename: format!("f{}.png", i),
                url: if i == 0 {
                    Some("https://cdn.example/f0.png".into())
                } else {
                    None
                },
            })
            .collect();
        let shown = format_attachments(&files).unwrap();
        let lines: Vec<&str> = shown.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "[f0.png](https://cdn.example/f0.png)");
        assert_eq!(lines[5], "+2 lampiran lainnya");
    }

    #[test]
    fn user_formatting() {
        let user = LoggedUser {
            id: 42,
            name: "sari".into(),
            avatar_url: None,
        };
        assert_eq!(format_user(Some(&user), "Tidak diketahui"), "<@42> (`42`)");
        assert_eq!(format_user(None, "Tidak diketahui"), "Tidak diketahui");
    }

    #[test]
    fn categories_parse_and_route() {
        assert_eq!(LogCategory::parse("Voice"), Some(LogCategory::Voice));
        assert_eq!(LogCategory::parse("threads"), None);
        let event = LogEvent::Role {
            action: crate::core::logging::StructureAction::Created,
            role_id: 1,
            name: "VIP".into(),
        };
        assert_eq!(event.category(), LogCategory::Server);
    }
}

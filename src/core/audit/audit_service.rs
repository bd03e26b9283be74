// Internal audit trail - a record of what the bot and its moderators did,
// kept separately from Discord's own audit log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub const MAX_RECENT: usize = 20;
pub const CONTEXT_PREVIEW_LIMIT: usize = 180;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    pub id: i64,
    pub guild_id: u64,
    pub action: String,
    pub actor_id: Option<u64>,
    pub target_id: Option<u64>,
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub guild_id: u64,
    pub action: String,
    pub actor_id: Option<u64>,
    pub target_id: Option<u64>,
    pub context: Option<String>,
}

impl NewAuditEntry {
    pub fn new(guild_id: u64, action: impl Into<String>) -> Self {
        Self {
            guild_id,
            action: action.into(),
            actor_id: None,
            target_id: None,
            context: None,
        }
    }

    pub fn actor(mut self, actor_id: u64) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn target(mut self, target_id: u64) -> Self {
        self.target_id = Some(target_id);
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert(
        &self,
        entry: &NewAuditEntry,
        created_at: DateTime<Utc>,
    ) -> Result<AuditLogEntry, AuditError>;

    /// Newest first, optionally restricted to actions starting with `action_prefix`.
    async fn recent(
        &self,
        guild_id: u64,
        limit: usize,
        action_prefix: Option<&str>,
    ) -> Result<Vec<AuditLogEntry>, AuditError>;

    /// `(action, count)` pairs, most frequent first.
    async fn action_summary(
        &self,
        guild_id: u64,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(String, i64)>, AuditError>;

    /// `(actor_id, count)` pairs, most active first.
    async fn actor_summary(
        &self,
        guild_id: u64,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(Option<u64>, i64)>, AuditError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct AuditService<S: AuditStore> {
    store: S,
}

impl<S: AuditStore> AuditService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, AuditError> {
        let saved = self.store.insert(&entry, Utc::now()).await?;
        tracing::debug!(
            guild_id = saved.guild_id,
            action = %saved.action,
            entry_id = saved.id,
            "Audit entry recorded"
        );
        Ok(saved)
    }

    /// Record an entry, logging instead of failing. Used from command paths
    /// where the primary action already succeeded.
    pub async fn record_quietly(&self, entry: NewAuditEntry) {
        let action = entry.action.clone();
        if let Err(e) = self.record(entry).await {
            tracing::warn!(action = %action, "Failed to write audit entry: {}", e);
        }
    }

    pub async fn recent(
        &self,
        guild_id: u64,
        limit: usize,
        action_prefix: Option<&str>,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        let prefix = action_prefix.map(str::trim).filter(|p| !p.is_empty());
        self.store
            .recent(guild_id, limit.clamp(1, MAX_RECENT), prefix)
            .await
    }

    pub async fn action_summary(
        &self,
        guild_id: u64,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(String, i64)>, AuditError> {
        self.store.action_summary(guild_id, limit, since).await
    }

    pub async fn actor_summary(
        &self,
        guild_id: u64,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(Option<u64>, i64)>, AuditError> {
        self.store.actor_summary(guild_id, limit, since).await
    }
}

/// Shorten a context value for embed display; "-" when there is nothing.
pub fn truncate_context(value: Option<&str>, limit: usize) -> String {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return "-".to_string(),
    };
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let cut: String = value.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", cut)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct MockAuditStore {
        pub(crate) entries: Mutex<Vec<AuditLogEntry>>,
    }

    fn ranked<K: std::hash::Hash + Eq + Clone + Ord>(
        counts: HashMap<K, i64>,
        limit: usize,
    ) -> Vec<(K, i64)> {
        let mut rows: Vec<(K, i64)> = counts.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.truncate(limit);
        rows
    }

    #[async_trait]
    impl AuditStore for MockAuditStore {
        async fn insert(
            &self,
            entry: &NewAuditEntry,
            created_at: DateTime<Utc>,
        ) -> Result<AuditLogEntry, AuditError> {
            let mut entries = self.entries.lock().unwrap();
            let saved = AuditLogEntry {
                id: entries.len() as i64 + 1,
                guild_id: entry.guild_id,
                action: entry.action.clone(),
                actor_id: entry.actor_id,
                target_id: entry.target_id,
                context: entry.context.clone(),
                created_at,
            };
            entries.push(saved.clone());
            Ok(saved)
        }

        async fn recent(
            &self,
            guild_id: u64,
            limit: usize,
            action_prefix: Option<&str>,
        ) -> Result<Vec<AuditLogEntry>, AuditError> {
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .iter()
                .rev()
                .filter(|e| e.guild_id == guild_id)
                .filter(|e| action_prefix.map_or(true, |p| e.action.starts_with(p)))
                .take(limit)
                .cloned()
                .collect())
        }

        async fn action_summary(
            &self,
            guild_id: u64,
            limit: usize,
            since: Option<DateTime<Utc>>,
        ) -> Result<Vec<(String, i64)>, AuditError> {
            let entries = self.entries.lock().unwrap();
            let mut counts = HashMap::new();
            for e in entries
                .iter()
                .filter(|e| e.guild_id == guild_id && since.map_or(true, |s| e.created_at >= s))
            {
                *counts.entry(e.action.clone()).or_insert(0) += 1;
            }
            Ok(ranked(counts, limit))
        }

        async fn actor_summary(
            &self,
            guild_id: u64,
            limit: usize,
            since: Option<DateTime<Utc>>,
        ) -> Result<Vec<(Option<u64>, i64)>, AuditError> {
            let entries = self.entries.lock().unwrap();
            let mut counts = HashMap::new();
            for e in entries
                .iter()
                .filter(|e| e.guild_id == guild_id && since.map_or(true, |s| e.created_at >= s))
            {
                *counts.entry(e.actor_id).or_insert(0) += 1;
            }
            Ok(ranked(counts, limit))
        }
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_filters_by_prefix() {
        let service = AuditService::new(MockAuditStore::default());
        service
            .record(NewAuditEntry::new(1, "moderation.warn").actor(10).target(20))
            .await
            .unwrap();
        service
            .record(NewAuditEntry::new(1, "automod.link").actor(10))
            .await
            .unwrap();
        service
            .record(NewAuditEntry::new(1, "moderation.kick").actor(11).context("spam"))
            .await
            .unwrap();
        service
            .record(NewAuditEntry::new(2, "moderation.ban"))
            .await
            .unwrap();

        let all = service.recent(1, 10, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].action, "moderation.kick");

        let moderation = service.recent(1, 10, Some(" moderation. ")).await.unwrap();
        assert_eq!(moderation.len(), 2);
        assert!(moderation.iter().all(|e| e.action.starts_with("moderation.")));

        // Blank prefix means no filter; the limit is clamped to at least one.
        assert_eq!(service.recent(1, 0, Some("  ")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn summaries_count_by_action_and_actor() {
        let service = AuditService::new(MockAuditStore::default());
        for _ in 0..3 {
            service
                .record(NewAuditEntry::new(1, "automod.violation"))
                .await
                .unwrap();
        }
        service
            .record(NewAuditEntry::new(1, "moderation.warn").actor(7))
            .await
            .unwrap();

        let actions = service.action_summary(1, 10, None).await.unwrap();
        assert_eq!(
            actions,
            vec![
                ("automod.violation".to_string(), 3),
                ("moderation.warn".to_string(), 1)
            ]
        );

        let actors = service.actor_summary(1, 5, None).await.unwrap();
        assert_eq!(actors[0], (None, 3));
        assert_eq!(actors[1], (Some(7), 1));

        let future = Utc::now() + chrono::Duration::hours(1);
        assert!(service
            .action_summary(1, 10, Some(future))
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn context_is_truncated_for_display() {
        assert_eq!(truncate_context(None, 180), "-");
        assert_eq!(truncate_context(Some("   "), 180), "-");
        assert_eq!(truncate_context(Some(" ok "), 180), "ok");
        let long = "a".repeat(200);
        let shown = truncate_context(Some(&long), 180);
        assert_eq!(shown.chars().count(), 180);
        assert!(shown.ends_with("..."));
    }
}

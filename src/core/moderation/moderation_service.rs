// Warning service - manual moderator warnings.
//
// Kick/ban/timeout act directly on Discord; only warnings need our own
// storage, so that's all this service owns.

use super::moderation_models::{ModerationError, Warn};
use async_trait::async_trait;
use chrono::Utc;

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait WarnStore: Send + Sync {
    async fn add_warn(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        reason: &str,
        created_at: chrono::DateTime<Utc>,
    ) -> Result<Warn, ModerationError>;

    /// Newest first.
    async fn list_warns(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<Warn>, ModerationError>;

    async fn remove_warn(&self, guild_id: u64, warn_id: i64) -> Result<bool, ModerationError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct WarnService<S: WarnStore> {
    store: S,
}

impl<S: WarnStore> WarnService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn add_warn(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        reason: &str,
    ) -> Result<Warn, ModerationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ModerationError::EmptyReason);
        }
        let warn = self
            .store
            .add_warn(guild_id, user_id, moderator_id, reason, Utc::now())
            .await?;
        tracing::info!(guild_id, user_id, moderator_id, warn_id = warn.id, "Warning issued");
        Ok(warn)
    }

    pub async fn list_warns(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<Warn>, ModerationError> {
        self.store.list_warns(guild_id, user_id, limit).await
    }

    /// Remove a warning from this guild. Ids from other guilds are not touched.
    pub async fn remove_warn(&self, guild_id: u64, warn_id: i64) -> Result<bool, ModerationError> {
        self.store.remove_warn(guild_id, warn_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockWarnStore {
        warns: Mutex<Vec<Warn>>,
    }

    #[async_trait]
    impl WarnStore for MockWarnStore {
        async fn add_warn(
            &self,
            guild_id: u64,
            user_id: u64,
            moderator_id: u64,
            reason: &str,
            created_at: chrono::DateTime<Utc>,
        ) -> Result<Warn, ModerationError> {
            let mut warns = self.warns.lock().unwrap();
            let warn = Warn {
                id: warns.len() as i64 + 1,
                guild_id,
                user_id,
                moderator_id,
                reason: reason.to_string(),
                created_at,
            };
            warns.push(warn.clone());
            Ok(warn)
        }

        async fn list_warns(
            &self,
            guild_id: u64,
            user_id: u64,
            limit: usize,
        ) -> Result<Vec<Warn>, ModerationError> {
            Ok(self
                .warns
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|w| w.guild_id == guild_id && w.user_id == user_id)
                .take(limit)
                .cloned()
                .collect())
        }

        async fn remove_warn(&self, guild_id: u64, warn_id: i64) -> Result<bool, ModerationError> {
            let mut warns = self.warns.lock().unwrap();
            let before = warns.len();
            warns.retain(|w| !(w.guild_id == guild_id && w.id == warn_id));
            Ok(warns.len() != before)
        }
    }

    #[tokio::test]
    async fn warns_are_listed_newest_first() {
        let service = WarnService::new(MockWarnStore::default());
        service.add_warn(1, 2, 3, "spam").await.unwrap();
        service.add_warn(1, 2, 3, "toxic").await.unwrap();
        service.add_warn(1, 9, 3, "other user").await.unwrap();

        let warns = service.list_warns(1, 2, 10).await.unwrap();
        assert_eq!(warns.len(), 2);
        assert_eq!(warns[0].reason, "toxic");
    }

    #[tokio::test]
    async fn remove_is_scoped_to_guild() {
        let service = WarnService::new(MockWarnStore::default());
        let warn = service.add_warn(1, 2, 3, "spam").await.unwrap();
        assert!(!service.remove_warn(2, warn.id).await.unwrap());
        assert!(service.remove_warn(1, warn.id).await.unwrap());
        assert!(!service.remove_warn(1, warn.id).await.unwrap());
    }

    #[tokio::test]
    async fn empty_reason_is_rejected() {
        let service = WarnService::new(MockWarnStore::default());
        assert!(matches!(
            service.add_warn(1, 2, 3, "   ").await,
            Err(ModerationError::EmptyReason)
        ));
    }
}

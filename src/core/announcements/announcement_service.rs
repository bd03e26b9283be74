// Scheduled announcements. The service owns validation and state; the
// Discord layer owns the job that actually posts the message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementStatus {
    Pending,
    Sent,
    Cancelled,
}

impl AnnouncementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementStatus::Pending => "pending",
            AnnouncementStatus::Sent => "sent",
            AnnouncementStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(AnnouncementStatus::Pending),
            "sent" => Some(AnnouncementStatus::Sent),
            "cancelled" => Some(AnnouncementStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledAnnouncement {
    pub id: i64,
    pub guild_id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub content: Option<String>,
    pub embed_title: Option<String>,
    pub embed_description: Option<String>,
    pub mention_role_id: Option<u64>,
    pub image_url: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub status: AnnouncementStatus,
    pub created_at: DateTime<Utc>,
}

impl ScheduledAnnouncement {
    /// Text body: the role mention (if any) followed by the content.
    pub fn message_text(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(role_id) = self.mention_role_id {
            parts.push(format!("<@&{}>", role_id));
        }
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            parts.push(content.to_string());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    pub fn has_embed(&self) -> bool {
        self.embed_title.is_some() || self.embed_description.is_some() || self.image_url.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewAnnouncement {
    pub guild_id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub content: Option<String>,
    pub embed_title: Option<String>,
    pub embed_description: Option<String>,
    pub mention_role_id: Option<u64>,
    pub image_url: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AnnouncementError {
    #[error("Waktu jadwal harus di masa depan.")]
    NotInFuture,

    #[error("Pengumuman harus memiliki pesan, embed, atau gambar.")]
    EmptyAnnouncement,

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    async fn insert(
        &self,
        new: &NewAnnouncement,
        created_at: DateTime<Utc>,
    ) -> Result<ScheduledAnnouncement, AnnouncementError>;

    async fn get(&self, id: i64) -> Result<Option<ScheduledAnnouncement>, AnnouncementError>;

    /// Pending announcements ordered by schedule time.
    async fn list_pending(
        &self,
        guild_id: Option<u64>,
    ) -> Result<Vec<ScheduledAnnouncement>, AnnouncementError>;

    /// Move a pending row to `to`. Returns false if it was not pending.
    async fn finish(&self, id: i64, to: AnnouncementStatus) -> Result<bool, AnnouncementError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct AnnouncementService<S: AnnouncementStore> {
    store: S,
}

impl<S: AnnouncementStore> AnnouncementService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn schedule(
        &self,
        mut new: NewAnnouncement,
        now: DateTime<Utc>,
    ) -> Result<ScheduledAnnouncement, AnnouncementError> {
        if new.scheduled_at <= now {
            return Err(AnnouncementError::NotInFuture);
        }
        for field in [
            &mut new.content,
            &mut new.embed_title,
            &mut new.embed_description,
            &mut new.image_url,
        ] {
            *field = field
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
        if new.content.is_none()
            && new.embed_title.is_none()
            && new.embed_description.is_none()
            && new.image_url.is_none()
            && new.mention_role_id.is_none()
        {
            return Err(AnnouncementError::EmptyAnnouncement);
        }

        let saved = self.store.insert(&new, now).await?;
        tracing::info!(
            guild_id = saved.guild_id,
            announcement_id = saved.id,
            scheduled_at = %saved.scheduled_at,
            "Announcement scheduled"
        );
        Ok(saved)
    }

    pub async fn get(&self, id: i64) -> Result<Option<ScheduledAnnouncement>, AnnouncementError> {
        self.store.get(id).await
    }

    pub async fn list_pending(
        &self,
        guild_id: u64,
    ) -> Result<Vec<ScheduledAnnouncement>, AnnouncementError> {
        self.store.list_pending(Some(guild_id)).await
    }

    pub async fn list_pending_all(&self) -> Result<Vec<ScheduledAnnouncement>, AnnouncementError> {
        self.store.list_pending(None).await
    }

    /// Cancel a pending announcement in `guild_id`. The row is kept.
    pub async fn cancel(&self, guild_id: u64, id: i64) -> Result<bool, AnnouncementError> {
        match self.store.get(id).await? {
            Some(a) if a.guild_id == guild_id => {
                self.store.finish(id, AnnouncementStatus::Cancelled).await
            }
            _ => Ok(false),
        }
    }

    /// Cancel without the guild check; used when delivery finds the target gone.
    pub async fn abandon(&self, id: i64) -> Result<bool, AnnouncementError> {
        self.store.finish(id, AnnouncementStatus::Cancelled).await
    }

    pub async fn mark_sent(&self, id: i64) -> Result<bool, AnnouncementError> {
        self.store.finish(id, AnnouncementStatus::Sent).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

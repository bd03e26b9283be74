// Reminder persistence and rules. Scheduling lives in the Discord layer,
// which owns the HTTP client needed to deliver them.

use super::duration::{is_allowed_reminder_delay, MAX_REMINDER, MIN_REMINDER};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub const MAX_REMINDER_MESSAGE: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: i64,
    pub guild_id: u64,
    pub user_id: u64,
    pub message: String,
    pub remind_at: DateTime<Utc>,
    pub channel_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub guild_id: u64,
    pub user_id: u64,
    pub message: String,
    pub remind_at: DateTime<Utc>,
    pub channel_id: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Durasi harus di antara {min} dan {max}.")]
    InvalidDelay { min: String, max: String },

    #[error("Pesan pengingat tidak boleh kosong atau lebih dari {0} karakter.")]
    InvalidMessage(usize),

    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn insert(
        &self,
        reminder: &NewReminder,
        created_at: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError>;

    async fn get(&self, id: i64) -> Result<Option<Reminder>, ReminderError>;

    async fn due(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, ReminderError>;

    async fn delete(&self, id: i64) -> Result<bool, ReminderError>;

    /// Delete only if the reminder belongs to this guild and user.
    async fn delete_owned(
        &self,
        guild_id: u64,
        user_id: u64,
        id: i64,
    ) -> Result<bool, ReminderError>;

    /// Ordered by remind_at, soonest first.
    async fn list_for_user(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Vec<Reminder>, ReminderError>;

    async fn all_pending(&self) -> Result<Vec<Reminder>, ReminderError>;
}

pub struct ReminderService<S: ReminderStore> {
    store: S,
}

impl<S: ReminderStore> ReminderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        mut reminder: NewReminder,
        now: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError> {
        let delay = (reminder.remind_at - now).to_std().unwrap_or_default();
        if !is_allowed_reminder_delay(delay) {
            return Err(ReminderError::InvalidDelay {
                min: super::duration::format_duration(MIN_REMINDER),
                max: super::duration::format_duration(MAX_REMINDER),
            });
        }
        reminder.message = reminder.message.trim().to_string();
        let length = reminder.message.chars().count();
        if length == 0 || length > MAX_REMINDER_MESSAGE {
            return Err(ReminderError::InvalidMessage(MAX_REMINDER_MESSAGE));
        }

        let created = self.store.insert(&reminder, now).await?;
        tracing::info!(
            reminder_id = created.id,
            guild_id = created.guild_id,
            user_id = created.user_id,
            remind_at = %created.remind_at,
            "Reminder created"
        );
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Reminder>, ReminderError> {
        self.store.get(id).await
    }

    pub async fn due(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, ReminderError> {
        self.store.due(now).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, ReminderError> {
        self.store.delete(id).await
    }

    pub async fn delete_owned(
        &self,
        guild_id: u64,
        user_id: u64,
        id: i64,
    ) -> Result<bool, ReminderError> {
        self.store.delete_owned(guild_id, user_id, id).await
    }

    pub async fn list_for_user(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Vec<Reminder>, ReminderError> {
        self.store.list_for_user(guild_id, user_id).await
    }

    pub async fn all_pending(&self) -> Result<Vec<Reminder>, ReminderError> {
        self.store.all_pending().await
    }
}
